//! Boundary validation for app records
//!
//! Raw records arrive as loosely-typed JSON from the dashboard API or storage.
//! Everything that reaches the analyzer or the aggregator passes through here
//! first; an unrecognized risk level or an empty data-type tag is rejected
//! once, with the offending record named, and never silently mapped.
//! Data-type tags are otherwise free-form.

use crate::facts::AppRiskFacts;
use crate::risk::RiskLevel;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use thiserror::Error;

/// The only error kind the boundary produces
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid input at {location}: `{field}` = {value:?} ({reason})")]
    InvalidInput {
        location: String,
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ValidationError {
    fn invalid(
        location: &str,
        field: &'static str,
        value: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        ValidationError::InvalidInput {
            location: location.to_string(),
            field,
            value: value.into(),
            reason,
        }
    }
}

/// App record as received, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAppRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub has_breaches: bool,
    #[serde(default)]
    pub third_party_sharing: bool,
    #[serde(default)]
    pub data_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
}

/// Accepted top-level shapes of an input file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordsFile {
    Bare(Vec<RawAppRecord>),
    Wrapped { apps: Vec<RawAppRecord> },
}

/// Parse a risk level name (case-insensitive, surrounding whitespace ignored)
pub fn parse_risk_level(value: &str) -> Result<RiskLevel, ValidationError> {
    parse_risk_level_at(value, "input")
}

fn parse_risk_level_at(value: &str, location: &str) -> Result<RiskLevel, ValidationError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "LOW" => Ok(RiskLevel::Low),
        "MEDIUM" => Ok(RiskLevel::Medium),
        "HIGH" => Ok(RiskLevel::High),
        "CRITICAL" => Ok(RiskLevel::Critical),
        _ => Err(ValidationError::invalid(
            location,
            "riskLevel",
            value,
            "expected one of LOW, MEDIUM, HIGH, CRITICAL",
        )),
    }
}

/// Normalize a free-form data-type tag
///
/// Trims, lowercases and collapses inner whitespace runs to one space.
/// Only empty or whitespace-only tags are rejected.
pub(crate) fn normalize_tag(tag: &str, location: &str) -> Result<String, ValidationError> {
    static WS_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let ws_re = WS_RE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let normalized = ws_re.replace_all(tag.trim(), " ").to_lowercase();
    if normalized.is_empty() {
        return Err(ValidationError::invalid(
            location,
            "dataTypes",
            tag,
            "tag must not be empty",
        ));
    }
    Ok(normalized)
}

fn record_location(index: usize, id: &str) -> String {
    format!("record {} (id {:?})", index, id)
}

/// Validate a single record into typed facts
pub fn validate_record(record: &RawAppRecord) -> Result<AppRiskFacts, ValidationError> {
    validate_record_at(record, &format!("record (id {:?})", record.id))
}

fn validate_record_at(
    record: &RawAppRecord,
    location: &str,
) -> Result<AppRiskFacts, ValidationError> {
    let id = record.id.trim();
    if id.is_empty() {
        return Err(ValidationError::invalid(
            location,
            "id",
            &record.id,
            "id must not be empty",
        ));
    }

    let data_types = record
        .data_types
        .iter()
        .map(|tag| normalize_tag(tag, location))
        .collect::<Result<BTreeSet<String>, _>>()?;

    let risk_level = record
        .risk_level
        .as_deref()
        .map(|level| parse_risk_level_at(level, location))
        .transpose()?;

    Ok(AppRiskFacts {
        id: id.to_string(),
        name: record.name.trim().to_string(),
        domain: record.domain.trim().to_lowercase(),
        has_breaches: record.has_breaches,
        third_party_sharing: record.third_party_sharing,
        data_types,
        risk_level,
    })
}

/// Validate a whole portfolio, stopping at the first invalid record
///
/// Ids must be unique so no app is counted twice.
pub fn validate_records(records: &[RawAppRecord]) -> Result<Vec<AppRiskFacts>, ValidationError> {
    let mut seen = HashSet::new();
    let mut facts = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let location = record_location(index, &record.id);
        let app = validate_record_at(record, &location)?;
        if !seen.insert(app.id.clone()) {
            return Err(ValidationError::invalid(
                &location,
                "id",
                &app.id,
                "duplicate id in portfolio",
            ));
        }
        facts.push(app);
    }

    Ok(facts)
}

/// Parse records from JSON text (a bare array or an object with `apps`)
pub fn parse_records(json: &str) -> Result<Vec<RawAppRecord>> {
    let file: RecordsFile =
        serde_json::from_str(json).context("expected a JSON array of apps or {\"apps\": [...]}")?;
    Ok(match file {
        RecordsFile::Bare(records) => records,
        RecordsFile::Wrapped { apps } => apps,
    })
}

/// Read and parse records from a file
pub fn load_records(path: &Path) -> Result<Vec<RawAppRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read apps file: {}", path.display()))?;
    let records = parse_records(&content)
        .with_context(|| format!("failed to parse apps file: {}", path.display()))?;
    tracing::info!(count = records.len(), path = %path.display(), "loaded app records");
    Ok(records)
}
