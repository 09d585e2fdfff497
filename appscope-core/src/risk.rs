//! Risk level vocabulary and score-to-level mapping
//!
//! Global invariants enforced:
//! - Risk levels are totally ordered: Low < Medium < High < Critical
//! - Score bins are closed, exhaustive and non-overlapping

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity classification of a connected app
///
/// Variant order is the severity order; `Ord` is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,      // <= 2
    Medium,   // 3-4
    High,     // 5-6
    Critical, // >= 7
}

impl RiskLevel {
    /// All levels in ascending severity
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// High or critical
    pub fn is_high_plus(&self) -> bool {
        *self >= RiskLevel::High
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lower bounds of the medium, high and critical bins
///
/// Anything below `medium` is low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreThresholds {
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        ScoreThresholds {
            medium: 3,
            high: 5,
            critical: 7,
        }
    }
}

/// Assign a risk level with default thresholds
pub fn assign_risk_level(score: u32) -> RiskLevel {
    assign_risk_level_with_thresholds(score, &ScoreThresholds::default())
}

/// Assign a risk level with custom thresholds
pub fn assign_risk_level_with_thresholds(score: u32, thresholds: &ScoreThresholds) -> RiskLevel {
    if score < thresholds.medium {
        RiskLevel::Low
    } else if score < thresholds.high {
        RiskLevel::Medium
    } else if score < thresholds.critical {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}
