//! Invariant Tests
//!
//! These tests explicitly validate the properties the analyzer and the
//! aggregator must always hold, across the full space of rule inputs.

use appscope_core::analyzer::analyze;
use appscope_core::facts::AppRiskFacts;
use appscope_core::{aggregate, RiskLevel};

/// Every combination of the three rule inputs
fn all_fact_combinations() -> Vec<(bool, bool, bool, AppRiskFacts)> {
    let mut out = Vec::new();
    for breaches in [false, true] {
        for sharing in [false, true] {
            for sensitive in [false, true] {
                let tags: Vec<&str> = if sensitive {
                    vec!["email", "personal"]
                } else {
                    vec!["email"]
                };
                let facts = AppRiskFacts::new("app", "App", "app.example")
                    .with_breaches(breaches)
                    .with_third_party_sharing(sharing)
                    .with_data_types(tags);
                out.push((breaches, sharing, sensitive, facts));
            }
        }
    }
    out
}

#[test]
fn test_analyze_is_deterministic() {
    for (_, _, _, facts) in all_fact_combinations() {
        let first = analyze(&facts);
        let second = analyze(&facts);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

#[test]
fn test_analyze_does_not_depend_on_call_history() {
    let quiet = AppRiskFacts::new("q", "Quiet", "quiet.example");
    let before = analyze(&quiet);
    for (_, _, _, facts) in all_fact_combinations() {
        let _ = analyze(&facts);
    }
    assert_eq!(analyze(&quiet), before);
}

#[test]
fn test_adding_a_factor_never_lowers_the_level() {
    let combos = all_fact_combinations();
    for (b1, s1, d1, f1) in &combos {
        for (b2, s2, d2, f2) in &combos {
            // f2 has every factor f1 has, and maybe more
            let superset = (!b1 || *b2) && (!s1 || *s2) && (!d1 || *d2);
            if superset {
                let lower = analyze(f1).risk_level;
                let upper = analyze(f2).risk_level;
                assert!(
                    upper >= lower,
                    "{:?} -> {:?} for ({},{},{}) -> ({},{},{})",
                    lower,
                    upper,
                    b1,
                    s1,
                    d1,
                    b2,
                    s2,
                    d2
                );
            }
        }
    }
}

#[test]
fn test_reasoning_and_factors_line_up() {
    for (_, _, _, facts) in all_fact_combinations() {
        let result = analyze(&facts);
        assert_eq!(result.reasoning.len(), result.factors.len());
        for (reason, factor) in result.reasoning.iter().zip(&result.factors) {
            assert_eq!(reason, &factor.reason);
        }
        assert_eq!(
            result.factors.iter().map(|f| f.points).sum::<u32>(),
            result.score
        );
        assert!((0.0..=1.0).contains(&result.confidence));
    }
}

#[test]
fn test_escalation_recommendations_only_for_high_plus() {
    for (_, _, _, facts) in all_fact_combinations() {
        let result = analyze(&facts);
        let escalated = result
            .recommendations
            .iter()
            .any(|r| r == "Consider deleting account");
        assert_eq!(escalated, result.risk_level >= RiskLevel::High);
        if escalated {
            let n = result.recommendations.len();
            assert_eq!(result.recommendations[n - 2], "Consider deleting account");
            assert_eq!(result.recommendations[n - 1], "Monitor for suspicious activity");
        }
    }
}

#[test]
fn test_both_sensitive_tags_count_once() {
    let one = AppRiskFacts::new("a", "A", "a.example").with_data_types(["financial"]);
    let both =
        AppRiskFacts::new("a", "A", "a.example").with_data_types(["personal", "financial"]);
    assert_eq!(analyze(&one).score, 2);
    assert_eq!(analyze(&both).score, 2);
    assert_eq!(analyze(&one), analyze(&both));
}

#[test]
fn test_aggregate_over_classified_levels_is_order_independent() {
    let levels: Vec<RiskLevel> = all_fact_combinations()
        .iter()
        .map(|(_, _, _, facts)| analyze(facts).risk_level)
        .collect();
    let forward = aggregate(levels.iter().copied());
    let backward = aggregate(levels.iter().rev().copied());
    assert_eq!(forward, backward);

    // Scores 0,2,2,4,3,5,5,7 -> LOW,LOW,LOW,MEDIUM,MEDIUM,HIGH,HIGH,CRITICAL
    assert_eq!(forward, 1 + 1 + 1 + 2 + 2 + 3 + 3 + 4);
}
