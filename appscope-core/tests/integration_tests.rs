//! Integration tests for the records -> report pipeline

use appscope_core::config::{load_and_resolve, AppscopeConfig};
use appscope_core::validate::{load_records, parse_records};
use appscope_core::{analyze_records, render_json, rescore_records, ResolvedConfig, RiskLevel};
use std::fs;

const PORTFOLIO: &str = r#"{
    "apps": [
        {
            "id": "slack",
            "name": "Slack",
            "domain": "slack.com",
            "hasBreaches": false,
            "thirdPartySharing": true,
            "dataTypes": ["personal", "messages"],
            "riskLevel": "HIGH"
        },
        {
            "id": "mint",
            "name": "Mint",
            "domain": "Mint.com",
            "hasBreaches": true,
            "thirdPartySharing": true,
            "dataTypes": ["Financial"],
            "riskLevel": "critical"
        },
        {
            "id": "todo",
            "name": "Todo",
            "domain": "todo.app",
            "dataTypes": [],
            "riskLevel": "LOW"
        }
    ]
}"#;

#[test]
fn test_analyze_records_end_to_end() {
    let records = parse_records(PORTFOLIO).unwrap();
    let report = analyze_records(&records, &ResolvedConfig::defaults().unwrap()).unwrap();

    // slack: 2 + 2 = 4 -> MEDIUM, mint: 3 + 2 + 2 = 7 -> CRITICAL, todo: 0 -> LOW
    assert_eq!(report.score, 2 + 4 + 1);
    let levels: Vec<(&str, RiskLevel)> = report
        .apps
        .iter()
        .map(|a| (a.id.as_str(), a.classification.risk_level))
        .collect();
    assert_eq!(
        levels,
        vec![
            ("mint", RiskLevel::Critical),
            ("slack", RiskLevel::Medium),
            ("todo", RiskLevel::Low),
        ]
    );

    let mint = &report.apps[0];
    assert_eq!(mint.domain, "mint.com");
    assert_eq!(mint.classification.recommendations.len(), 6);
}

#[test]
fn test_rescore_records_uses_stored_levels() {
    let records = parse_records(PORTFOLIO).unwrap();
    let summary = rescore_records(&records, &ResolvedConfig::defaults().unwrap()).unwrap();
    // HIGH + CRITICAL + LOW
    assert_eq!(summary.score, 3 + 4 + 1);
    assert_eq!(summary.high_plus_count, 2);
}

#[test]
fn test_unknown_level_is_rejected_before_aggregation() {
    let records = parse_records(
        r#"[{"id": "a", "riskLevel": "LOW"}, {"id": "b", "riskLevel": "EXTREME"}]"#,
    )
    .unwrap();
    let config = ResolvedConfig::defaults().unwrap();
    let err = rescore_records(&records, &config).unwrap_err();
    assert!(format!("{:#}", err).contains("EXTREME"));

    // Classification validates the same way, even though it ignores stored levels
    assert!(analyze_records(&records, &config).is_err());
}

#[test]
fn test_config_changes_classification() {
    let config: AppscopeConfig = serde_json::from_str(
        r#"{"sensitive_data_types": ["messages"], "thresholds": {"medium": 2, "high": 4, "critical": 6}}"#,
    )
    .unwrap();
    let resolved = config.resolve().unwrap();

    let records = parse_records(PORTFOLIO).unwrap();
    let report = analyze_records(&records, &resolved).unwrap();
    let slack = report.apps.iter().find(|a| a.id == "slack").unwrap();
    // sharing (2) + messages (2) = 4 -> HIGH under these thresholds
    assert_eq!(slack.classification.risk_level, RiskLevel::High);
    let mint = report.apps.iter().find(|a| a.id == "mint").unwrap();
    // "financial" is no longer sensitive: 3 + 2 = 5 -> HIGH
    assert_eq!(mint.classification.score, 5);
}

#[test]
fn test_load_records_and_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let apps_path = dir.path().join("apps.json");
    fs::write(&apps_path, PORTFOLIO).unwrap();
    fs::write(
        dir.path().join(".appscoperc.json"),
        r#"{"confidence": 0.6, "top": 1}"#,
    )
    .unwrap();

    let records = load_records(&apps_path).unwrap();
    let config = load_and_resolve(dir.path(), None).unwrap();
    assert!(config.config_path.is_some());

    let report = analyze_records(&records, &config)
        .unwrap()
        .filtered(config.min_level, config.top_n);
    assert_eq!(report.apps.len(), 1);
    assert_eq!(report.apps[0].classification.confidence, 0.6);
    assert_eq!(report.summary.total_apps, 3);
}

#[test]
fn test_missing_records_file_has_context() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_records(&dir.path().join("missing.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read apps file"));
}

#[test]
fn test_json_output_is_stable() {
    let records = parse_records(PORTFOLIO).unwrap();
    let config = ResolvedConfig::defaults().unwrap();
    let a = render_json(&analyze_records(&records, &config).unwrap());
    let b = render_json(&analyze_records(&records, &config).unwrap());
    assert_eq!(a, b);
}

#[test]
fn test_free_form_tag_does_not_block_classification() {
    let records = parse_records(
        r#"[
            {"id": "a", "hasBreaches": true, "dataTypes": ["personal", "payment info"]},
            {"id": "b", "dataTypes": ["Payment Info"]}
        ]"#,
    )
    .unwrap();
    let report = analyze_records(&records, &ResolvedConfig::defaults().unwrap()).unwrap();

    let a = report.apps.iter().find(|app| app.id == "a").unwrap();
    // breach (3) + sensitive (2); the unknown tag adds nothing
    assert_eq!(a.classification.score, 5);
    assert_eq!(a.classification.risk_level, RiskLevel::High);

    let b = report.apps.iter().find(|app| app.id == "b").unwrap();
    assert_eq!(b.classification.score, 0);
    assert_eq!(b.classification.risk_level, RiskLevel::Low);
}
