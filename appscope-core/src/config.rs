//! Configuration file support for appscope
//!
//! Loads rule tables and report filters from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.appscoperc.json` in the working directory
//! 3. `appscope.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::aggregate::LevelWeights;
use crate::analyzer::{RulePoints, ThreatAnalyzer, DEFAULT_CONFIDENCE};
use crate::facts::DEFAULT_SENSITIVE_DATA_TYPES;
use crate::risk::{RiskLevel, ScoreThresholds};
use crate::validate::{normalize_tag, parse_risk_level};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound for any single rule's points
const MAX_RULE_POINTS: u32 = 100;

/// Upper bound for any single level weight
const MAX_LEVEL_WEIGHT: u32 = 100;

/// appscope configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppscopeConfig {
    /// Points added by each rule
    #[serde(default)]
    pub points: Option<PointsConfig>,

    /// Score thresholds for the medium/high/critical levels
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Per-level weights for the portfolio score
    #[serde(default)]
    pub level_weights: Option<LevelWeightConfig>,

    /// Confidence reported with each classification (default: 0.85)
    #[serde(default)]
    pub confidence: Option<f64>,

    /// Data-type tags treated as sensitive (default: personal, financial).
    /// An empty list disables the sensitive-data rule.
    #[serde(default)]
    pub sensitive_data_types: Option<Vec<String>>,

    /// Lowest level to show in reports (default: show all)
    #[serde(default)]
    pub min_level: Option<String>,

    /// Maximum number of apps to show
    #[serde(default)]
    pub top: Option<usize>,
}

/// Custom rule points
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointsConfig {
    /// Known breach history (default: 3)
    pub breaches: Option<u32>,
    /// Third-party data sharing (default: 2)
    pub third_party_sharing: Option<u32>,
    /// Sensitive data types handled (default: 2)
    pub sensitive_data: Option<u32>,
}

/// Custom score thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Score at which an app becomes medium risk (default: 3)
    pub medium: Option<u32>,
    /// Score at which an app becomes high risk (default: 5)
    pub high: Option<u32>,
    /// Score at which an app becomes critical (default: 7)
    pub critical: Option<u32>,
}

/// Custom portfolio weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelWeightConfig {
    pub low: Option<u32>,
    pub medium: Option<u32>,
    pub high: Option<u32>,
    pub critical: Option<u32>,
}

/// Resolved configuration ready for use
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub analyzer: ThreatAnalyzer,
    pub level_weights: LevelWeights,
    /// Filters
    pub min_level: Option<RiskLevel>,
    pub top_n: Option<usize>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl AppscopeConfig {
    fn rule_points(&self) -> RulePoints {
        let defaults = RulePoints::default();
        match &self.points {
            Some(p) => RulePoints {
                breaches: p.breaches.unwrap_or(defaults.breaches),
                third_party_sharing: p
                    .third_party_sharing
                    .unwrap_or(defaults.third_party_sharing),
                sensitive_data: p.sensitive_data.unwrap_or(defaults.sensitive_data),
            },
            None => defaults,
        }
    }

    fn score_thresholds(&self) -> ScoreThresholds {
        let defaults = ScoreThresholds::default();
        match &self.thresholds {
            Some(t) => ScoreThresholds {
                medium: t.medium.unwrap_or(defaults.medium),
                high: t.high.unwrap_or(defaults.high),
                critical: t.critical.unwrap_or(defaults.critical),
            },
            None => defaults,
        }
    }

    fn level_weights(&self) -> LevelWeights {
        let defaults = LevelWeights::default();
        match &self.level_weights {
            Some(w) => LevelWeights {
                low: w.low.unwrap_or(defaults.low),
                medium: w.medium.unwrap_or(defaults.medium),
                high: w.high.unwrap_or(defaults.high),
                critical: w.critical.unwrap_or(defaults.critical),
            },
            None => defaults,
        }
    }

    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        let points = self.rule_points();
        for (name, val) in [
            ("breaches", points.breaches),
            ("third_party_sharing", points.third_party_sharing),
            ("sensitive_data", points.sensitive_data),
        ] {
            if val > MAX_RULE_POINTS {
                anyhow::bail!(
                    "points.{} must be at most {} (got {})",
                    name,
                    MAX_RULE_POINTS,
                    val
                );
            }
        }

        // Thresholds must be positive and strictly ordered so bins never overlap
        let t = self.score_thresholds();
        if t.medium == 0 {
            anyhow::bail!("thresholds.medium must be positive (got {})", t.medium);
        }
        if t.medium >= t.high {
            anyhow::bail!(
                "thresholds.medium ({}) must be less than thresholds.high ({})",
                t.medium,
                t.high
            );
        }
        if t.high >= t.critical {
            anyhow::bail!(
                "thresholds.high ({}) must be less than thresholds.critical ({})",
                t.high,
                t.critical
            );
        }

        // Weights are bounded and must not decrease with severity
        let w = self.level_weights();
        for (name, val) in [
            ("low", w.low),
            ("medium", w.medium),
            ("high", w.high),
            ("critical", w.critical),
        ] {
            if val > MAX_LEVEL_WEIGHT {
                anyhow::bail!(
                    "level_weights.{} must be at most {} (got {})",
                    name,
                    MAX_LEVEL_WEIGHT,
                    val
                );
            }
        }
        if !(w.low <= w.medium && w.medium <= w.high && w.high <= w.critical) {
            anyhow::bail!(
                "level_weights must not decrease with severity (got low={}, medium={}, high={}, critical={})",
                w.low,
                w.medium,
                w.high,
                w.critical
            );
        }

        if let Some(c) = self.confidence {
            if !(0.0..=1.0).contains(&c) {
                anyhow::bail!("confidence must be between 0.0 and 1.0 (got {})", c);
            }
        }

        for tag in self.sensitive_data_types.iter().flatten() {
            normalize_tag(tag, "config")
                .with_context(|| format!("invalid sensitive_data_types entry: {:?}", tag))?;
        }

        if let Some(ref level) = self.min_level {
            parse_risk_level(level)
                .with_context(|| format!("invalid min_level: {:?}", level))?;
        }

        Ok(())
    }

    /// Resolve config into the form used by the analyzer and aggregator
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let sensitive_data_types = match &self.sensitive_data_types {
            Some(configured) => {
                let mut tags = configured
                    .iter()
                    .map(|tag| normalize_tag(tag, "config"))
                    .collect::<Result<Vec<_>, _>>()?;
                tags.sort();
                tags.dedup();
                tags
            }
            None => DEFAULT_SENSITIVE_DATA_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        let analyzer = ThreatAnalyzer {
            points: self.rule_points(),
            thresholds: self.score_thresholds(),
            confidence: self.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            sensitive_data_types,
        };

        let min_level = self
            .min_level
            .as_deref()
            .map(parse_risk_level)
            .transpose()?;

        Ok(ResolvedConfig {
            analyzer,
            level_weights: self.level_weights(),
            min_level,
            top_n: self.top,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        AppscopeConfig::default().resolve()
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.appscoperc.json`
/// 2. `appscope.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(AppscopeConfig, PathBuf)>> {
    for name in [".appscoperc.json", "appscope.config.json"] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<AppscopeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: AppscopeConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (AppscopeConfig::default(), None),
        }
    };

    match &source_path {
        Some(path) => tracing::info!(path = %path.display(), "using config file"),
        None => tracing::debug!("no config file found, using defaults"),
    }

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
