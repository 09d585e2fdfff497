//! Typed risk facts for a single connected app
//!
//! Facts are produced by `validate` at the boundary and never mutated by the
//! analyzer or the aggregator.

use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Data-type tags treated as sensitive by default
pub const DEFAULT_SENSITIVE_DATA_TYPES: &[&str] = &["personal", "financial"];

/// Structured facts about one app, already validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppRiskFacts {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub has_breaches: bool,
    pub third_party_sharing: bool,
    /// Normalized tags (trimmed, lowercase), iterated in sorted order
    pub data_types: BTreeSet<String>,
    /// Level from an earlier classification; only used when re-scoring
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub risk_level: Option<RiskLevel>,
}

impl AppRiskFacts {
    /// Facts with no risk factors set
    pub fn new(id: impl Into<String>, name: impl Into<String>, domain: impl Into<String>) -> Self {
        AppRiskFacts {
            id: id.into(),
            name: name.into(),
            domain: domain.into(),
            has_breaches: false,
            third_party_sharing: false,
            data_types: BTreeSet::new(),
            risk_level: None,
        }
    }

    pub fn with_breaches(mut self, has_breaches: bool) -> Self {
        self.has_breaches = has_breaches;
        self
    }

    pub fn with_third_party_sharing(mut self, sharing: bool) -> Self {
        self.third_party_sharing = sharing;
        self
    }

    pub fn with_data_types<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_types = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_risk_level(mut self, level: RiskLevel) -> Self {
        self.risk_level = Some(level);
        self
    }

    /// True if any tag is in `sensitive`
    pub fn handles_any<S: AsRef<str>>(&self, sensitive: &[S]) -> bool {
        sensitive
            .iter()
            .any(|tag| self.data_types.contains(tag.as_ref()))
    }
}
