// crates/backdrop-validation/tests/result.rs
// ============================================================================
// Module: Validation Result Tests
// Description: Tests for result aggregation and report rendering.
// Purpose: Validate merge semantics, grouping, and the report surfaces.
// Dependencies: backdrop-validation, proptest, serde_json
// ============================================================================
//! ## Overview
//! Merge must be associative and commutative with respect to validity;
//! grouping and filtering must preserve issues; reports must render for
//! machine, admin, and client consumers.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use backdrop_validation::Severity;
use backdrop_validation::ValidationIssue;
use backdrop_validation::ValidationResult;
use proptest::prelude::*;

/// Builds a result from (code, severity) pairs.
fn result_of(pairs: &[(&str, Severity)]) -> ValidationResult {
    ValidationResult::from_issues(
        pairs
            .iter()
            .map(|(code, severity)| {
                ValidationIssue::new(*code, format!("{code} happened"), "$.field", *severity)
            })
            .collect(),
    )
}

/// Verifies validity is the absence of error-severity issues.
#[test]
fn validity_ignores_warnings_and_info() {
    assert!(ValidationResult::valid().is_valid());
    assert!(result_of(&[("W", Severity::Warning), ("I", Severity::Info)]).is_valid());
    assert!(!result_of(&[("E", Severity::Error)]).is_valid());
}

/// Verifies merge keeps both sides' issues in order.
#[test]
fn merge_concatenates_issues() {
    let merged = result_of(&[("A", Severity::Error)]).merge(result_of(&[("B", Severity::Info)]));
    let codes: Vec<&str> = merged.issues.iter().map(|issue| issue.code.as_str()).collect();
    assert_eq!(codes, vec!["A", "B"]);
    assert!(!merged.is_valid());
}

/// Verifies filtering and grouping.
#[test]
fn filter_and_group_by_path() {
    let mut result = result_of(&[("A", Severity::Error)]);
    result.push(ValidationIssue::new("B", "other", "$.other", Severity::Warning));
    let grouped = result.group_by_path();
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped.get("$.field").map(Vec::len), Some(1));

    let errors_only = result.filter(|issue| issue.severity == Severity::Error);
    assert_eq!(errors_only.issues.len(), 1);
}

/// Verifies the report surfaces render the issue inventory.
#[test]
fn reports_render_all_surfaces() {
    let result = result_of(&[("BROKEN", Severity::Error), ("ODD", Severity::Warning)]);

    let report = result.to_json_report();
    assert_eq!(report["valid"], serde_json::json!(false));
    assert_eq!(report["errorCount"], serde_json::json!(1));
    assert_eq!(report["warningCount"], serde_json::json!(1));

    let html = result.to_html_report();
    assert!(html.contains("<table>"));
    assert!(html.contains("BROKEN"));

    let admin = result.admin_summary();
    assert!(admin.contains("failed"));
    assert!(admin.contains("$.field"));

    let client = result.client_summary();
    assert!(client.contains("BROKEN"));
    assert!(!client.contains("happened"));
}

proptest! {
    /// Merge validity is the conjunction of input validities, in any order.
    #[test]
    fn merge_validity_is_commutative_conjunction(
        left_errors in 0usize..3,
        left_warnings in 0usize..3,
        right_errors in 0usize..3,
        right_warnings in 0usize..3,
    ) {
        let build = |errors: usize, warnings: usize| {
            let mut issues = Vec::new();
            for index in 0..errors {
                issues.push(ValidationIssue::new(
                    format!("E{index}"), "err", "$", Severity::Error,
                ));
            }
            for index in 0..warnings {
                issues.push(ValidationIssue::new(
                    format!("W{index}"), "warn", "$", Severity::Warning,
                ));
            }
            ValidationResult::from_issues(issues)
        };
        let left = build(left_errors, left_warnings);
        let right = build(right_errors, right_warnings);
        let expected = left.is_valid() && right.is_valid();
        prop_assert_eq!(left.clone().merge(right.clone()).is_valid(), expected);
        prop_assert_eq!(right.merge(left).is_valid(), expected);
    }
}
