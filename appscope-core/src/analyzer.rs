//! Per-app threat analyzer
//!
//! Pure, stateless rule evaluation over `AppRiskFacts`.
//! No I/O. Same inputs always produce the same outputs.
//!
//! Rules fire in a fixed order and are additive. Every point of the score is
//! recorded as a `RuleFactor`, and every recommendation is emitted by the rule
//! (or the level escalation) that produced it.

use crate::facts::{AppRiskFacts, DEFAULT_SENSITIVE_DATA_TYPES};
use crate::risk::{assign_risk_level_with_thresholds, RiskLevel, ScoreThresholds};
use serde::{Deserialize, Serialize};

/// Confidence reported for rule-based classifications
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

/// Points added to the score by each rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePoints {
    pub breaches: u32,
    pub third_party_sharing: u32,
    pub sensitive_data: u32,
}

impl Default for RulePoints {
    fn default() -> Self {
        RulePoints {
            breaches: 3,
            third_party_sharing: 2,
            sensitive_data: 2,
        }
    }
}

/// A rule that fired, and what it contributed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFactor {
    pub id: String,
    pub points: u32,
    pub reason: String,
}

/// Output of the analyzer for one app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassificationResult {
    pub risk_level: RiskLevel,
    pub confidence: f64,
    /// Factor descriptions in rule-firing order
    pub reasoning: Vec<String>,
    /// Remediation steps in rule-firing order, escalation steps last
    pub recommendations: Vec<String>,
    pub score: u32,
    pub factors: Vec<RuleFactor>,
}

/// Rule-based classifier with immutable tables
#[derive(Debug, Clone, PartialEq)]
pub struct ThreatAnalyzer {
    pub points: RulePoints,
    pub thresholds: ScoreThresholds,
    pub confidence: f64,
    pub sensitive_data_types: Vec<String>,
}

impl Default for ThreatAnalyzer {
    fn default() -> Self {
        ThreatAnalyzer {
            points: RulePoints::default(),
            thresholds: ScoreThresholds::default(),
            confidence: DEFAULT_CONFIDENCE,
            sensitive_data_types: DEFAULT_SENSITIVE_DATA_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// A fired rule before it is folded into the result
struct RuleHit {
    id: &'static str,
    points: u32,
    reason: &'static str,
    recommendations: &'static [&'static str],
}

const BREACH_RECOMMENDATIONS: &[&str] = &[
    "Change password immediately",
    "Enable two-factor authentication",
];

const SHARING_RECOMMENDATIONS: &[&str] = &[
    "Review privacy settings",
    "Opt out of data sharing if possible",
];

const ESCALATION_RECOMMENDATIONS: &[&str] = &[
    "Consider deleting account",
    "Monitor for suspicious activity",
];

/// Classify one app with the default rule tables
pub fn analyze(facts: &AppRiskFacts) -> ClassificationResult {
    ThreatAnalyzer::default().analyze(facts)
}

impl ThreatAnalyzer {
    /// Classify one app
    pub fn analyze(&self, facts: &AppRiskFacts) -> ClassificationResult {
        let mut score = 0u32;
        let mut reasoning = Vec::new();
        let mut recommendations = Vec::new();
        let mut factors = Vec::new();

        // Fixed order: breach history, sharing, sensitive data
        let hits = [
            self.check_breach_history(facts),
            self.check_third_party_sharing(facts),
            self.check_sensitive_data(facts),
        ];

        for hit in hits.into_iter().flatten() {
            score = score.saturating_add(hit.points);
            reasoning.push(hit.reason.to_string());
            recommendations.extend(hit.recommendations.iter().map(|r| r.to_string()));
            factors.push(RuleFactor {
                id: hit.id.to_string(),
                points: hit.points,
                reason: hit.reason.to_string(),
            });
        }

        let risk_level = assign_risk_level_with_thresholds(score, &self.thresholds);
        if risk_level.is_high_plus() {
            recommendations.extend(ESCALATION_RECOMMENDATIONS.iter().map(|r| r.to_string()));
        }

        tracing::debug!(
            app = %facts.id,
            score,
            level = %risk_level,
            "classified app"
        );

        ClassificationResult {
            risk_level,
            confidence: self.confidence,
            reasoning,
            recommendations,
            score,
            factors,
        }
    }

    fn check_breach_history(&self, facts: &AppRiskFacts) -> Option<RuleHit> {
        facts.has_breaches.then_some(RuleHit {
            id: "breach_history",
            points: self.points.breaches,
            reason: "App has been involved in data breaches",
            recommendations: BREACH_RECOMMENDATIONS,
        })
    }

    fn check_third_party_sharing(&self, facts: &AppRiskFacts) -> Option<RuleHit> {
        facts.third_party_sharing.then_some(RuleHit {
            id: "third_party_sharing",
            points: self.points.third_party_sharing,
            reason: "App shares data with third parties",
            recommendations: SHARING_RECOMMENDATIONS,
        })
    }

    // One combined condition: several sensitive tags still count once.
    fn check_sensitive_data(&self, facts: &AppRiskFacts) -> Option<RuleHit> {
        facts
            .handles_any(&self.sensitive_data_types)
            .then_some(RuleHit {
                id: "sensitive_data",
                points: self.points.sensitive_data,
                reason: "App handles sensitive data types",
                recommendations: &[],
            })
    }
}
