//! appscope core library - threat classification and portfolio risk scoring for connected SaaS apps

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Analysis is strictly per-app; aggregation consumes only risk levels
// - No global mutable state
// - No randomness, clocks, threads, or async
// - Rule evaluation order is fixed and explicit
// - Malformed input is rejected in `validate`, never inside the analyzer
// - Identical input yields byte-for-byte identical output

pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod facts;
pub mod report;
pub mod risk;
pub mod validate;

pub use aggregate::{aggregate, aggregate_with_weights, LevelWeights, PortfolioSummary};
pub use analyzer::{analyze, ClassificationResult, ThreatAnalyzer};
pub use config::ResolvedConfig;
pub use facts::AppRiskFacts;
pub use report::{render_json, render_text, PortfolioReport};
pub use risk::RiskLevel;
pub use validate::{RawAppRecord, ValidationError};

use anyhow::Result;

/// Validate raw records and build a portfolio report with the given config
pub fn analyze_records(records: &[RawAppRecord], config: &ResolvedConfig) -> Result<PortfolioReport> {
    let facts = validate::validate_records(records)?;
    Ok(report::analyze_portfolio(
        &facts,
        &config.analyzer,
        &config.level_weights,
    ))
}

/// Validate raw records and aggregate their stored risk levels
pub fn rescore_records(records: &[RawAppRecord], config: &ResolvedConfig) -> Result<PortfolioSummary> {
    let facts = validate::validate_records(records)?;
    Ok(report::rescore_portfolio(&facts, &config.level_weights)?)
}
