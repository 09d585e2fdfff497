//! Portfolio reports and output rendering
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs
//! - Filters narrow what is shown, never what is scored

use crate::aggregate::{summarize, LevelWeights, PortfolioSummary};
use crate::analyzer::{ClassificationResult, ThreatAnalyzer};
use crate::facts::AppRiskFacts;
use crate::risk::RiskLevel;
use crate::validate::ValidationError;
use serde::{Deserialize, Serialize};

/// Classification of one app, with its identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppRiskReport {
    pub id: String,
    pub name: String,
    pub domain: String,
    #[serde(flatten)]
    pub classification: ClassificationResult,
}

/// Classified apps plus the portfolio score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PortfolioReport {
    pub score: u32,
    pub summary: PortfolioSummary,
    pub apps: Vec<AppRiskReport>,
}

/// Classify every app and score the portfolio from the fresh levels
pub fn analyze_portfolio(
    apps: &[AppRiskFacts],
    analyzer: &ThreatAnalyzer,
    weights: &LevelWeights,
) -> PortfolioReport {
    let reports: Vec<AppRiskReport> = apps
        .iter()
        .map(|facts| AppRiskReport {
            id: facts.id.clone(),
            name: facts.name.clone(),
            domain: facts.domain.clone(),
            classification: analyzer.analyze(facts),
        })
        .collect();

    let summary = summarize(
        reports.iter().map(|r| r.classification.risk_level),
        weights,
    );

    PortfolioReport {
        score: summary.score,
        summary,
        apps: sort_reports(reports),
    }
}

/// Score already-classified apps from their stored levels
///
/// Every app must carry a previous level; a missing one is invalid input,
/// not a zero.
pub fn rescore_portfolio(
    apps: &[AppRiskFacts],
    weights: &LevelWeights,
) -> Result<PortfolioSummary, ValidationError> {
    let levels = apps
        .iter()
        .map(|app| {
            app.risk_level.ok_or_else(|| ValidationError::InvalidInput {
                location: format!("app (id {:?})", app.id),
                field: "riskLevel",
                value: String::new(),
                reason: "a stored risk level is required for re-scoring",
            })
        })
        .collect::<Result<Vec<RiskLevel>, _>>()?;

    Ok(summarize(levels, weights))
}

/// Sort reports deterministically
pub fn sort_reports(mut reports: Vec<AppRiskReport>) -> Vec<AppRiskReport> {
    reports.sort_by(|a, b| {
        // 1. Risk level descending
        b.classification
            .risk_level
            .cmp(&a.classification.risk_level)
            // 2. Score descending
            .then_with(|| b.classification.score.cmp(&a.classification.score))
            // 3. Name ascending
            .then_with(|| a.name.cmp(&b.name))
            // 4. Id ascending
            .then_with(|| a.id.cmp(&b.id))
    });
    reports
}

impl PortfolioReport {
    /// Keep apps at or above `min_level`, then the first `top_n`
    ///
    /// Score and summary still describe the whole portfolio.
    pub fn filtered(mut self, min_level: Option<RiskLevel>, top_n: Option<usize>) -> Self {
        if let Some(min) = min_level {
            self.apps
                .retain(|app| app.classification.risk_level >= min);
        }
        if let Some(n) = top_n {
            self.apps.truncate(n);
        }
        self
    }
}

/// Render a report as text output
pub fn render_text(report: &PortfolioReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<10} {:<6} {:<24} {}\n",
        "LEVEL", "SCORE", "APP", "DOMAIN"
    ));

    for app in &report.apps {
        output.push_str(&format!(
            "{:<10} {:<6} {:<24} {}\n",
            app.classification.risk_level,
            app.classification.score,
            truncate_or_pad(&app.name, 24),
            app.domain,
        ));
        for reason in &app.classification.reasoning {
            output.push_str(&format!("           - {}\n", reason));
        }
        for rec in &app.classification.recommendations {
            output.push_str(&format!("           > {}\n", rec));
        }
    }

    let s = &report.summary;
    output.push_str(&format!(
        "\nPortfolio score: {} ({} apps: {} critical, {} high, {} medium, {} low)\n",
        report.score, s.total_apps, s.critical, s.high, s.medium, s.low
    ));

    output
}

/// Render a report as JSON output
pub fn render_json(report: &PortfolioReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
