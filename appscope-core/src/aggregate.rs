//! Portfolio risk aggregation
//!
//! Global invariants enforced:
//! - Aggregates are strictly derived (never stored, always computed)
//! - Every entry contributes exactly once; traversal order does not matter
//! - Only risk levels are consumed, never analyzer internals

use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

/// Per-level weights for the portfolio score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelWeights {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

impl Default for LevelWeights {
    fn default() -> Self {
        LevelWeights {
            low: 1,
            medium: 2,
            high: 3,
            critical: 4,
        }
    }
}

impl LevelWeights {
    pub fn weight(&self, level: RiskLevel) -> u32 {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
            RiskLevel::Critical => self.critical,
        }
    }
}

/// Portfolio score with default weights
pub fn aggregate<I>(levels: I) -> u32
where
    I: IntoIterator<Item = RiskLevel>,
{
    aggregate_with_weights(levels, &LevelWeights::default())
}

/// Portfolio score with custom weights
pub fn aggregate_with_weights<I>(levels: I, weights: &LevelWeights) -> u32
where
    I: IntoIterator<Item = RiskLevel>,
{
    levels
        .into_iter()
        .fold(0u32, |total, level| total.saturating_add(weights.weight(level)))
}

/// Per-level counts and score for a portfolio
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PortfolioSummary {
    pub total_apps: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
    pub high_plus_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest: Option<RiskLevel>,
    pub score: u32,
}

/// Summarize a portfolio from its risk levels
pub fn summarize<I>(levels: I, weights: &LevelWeights) -> PortfolioSummary
where
    I: IntoIterator<Item = RiskLevel>,
{
    let mut summary = PortfolioSummary::default();

    for level in levels {
        summary.total_apps += 1;
        match level {
            RiskLevel::Low => summary.low += 1,
            RiskLevel::Medium => summary.medium += 1,
            RiskLevel::High => summary.high += 1,
            RiskLevel::Critical => summary.critical += 1,
        }
        if level.is_high_plus() {
            summary.high_plus_count += 1;
        }
        summary.highest = summary.highest.max(Some(level));
        summary.score = summary.score.saturating_add(weights.weight(level));
    }

    summary
}
