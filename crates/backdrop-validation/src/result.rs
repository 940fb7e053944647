// crates/backdrop-validation/src/result.rs
// ============================================================================
// Module: Backdrop Validation Results
// Description: Issue records, aggregate results, and report rendering.
// Purpose: Carry structured validation outcomes across engine and validators.
// Dependencies: serde, serde_json, time, uuid
// ============================================================================

//! ## Overview
//! Every validator, the schema engine and the custom registry alike,
//! produces a [`ValidationResult`]: an ordered list of [`ValidationIssue`]
//! records split by severity. Results merge associatively and commutatively
//! with respect to validity, filter and group by path, and render as JSON,
//! HTML, or plain-text summaries for admin and client consumers. Batch
//! validation aggregates per-item results and never propagates an individual
//! failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Issue severity.
///
/// # Invariants
/// - Only [`Severity::Error`] affects validity; warnings and info are
///   advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks acceptance of the validated value.
    Error,
    /// Advisory; the value is still accepted.
    Warning,
    /// Informational note.
    Info,
}

impl Severity {
    /// Returns a stable label for reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

// ============================================================================
// SECTION: Issues
// ============================================================================

/// Single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Unique issue identifier.
    pub id: Uuid,
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Path of the offending value (dotted, `$` for the root).
    pub path: String,
    /// Severity of the finding.
    pub severity: Severity,
    /// Optional structured details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ValidationIssue {
    /// Creates an issue with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        path: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            message: message.into(),
            path: path.into(),
            severity,
            details: None,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Attaches structured details to the issue.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

// ============================================================================
// SECTION: Aggregate Result
// ============================================================================

/// Aggregate validation outcome.
///
/// # Invariants
/// - `is_valid` is true exactly when no error-severity issue is present, so
///   [`ValidationResult::merge`] is associative and commutative with respect
///   to validity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValidationResult {
    /// Issues in discovery order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Creates an empty, valid result.
    #[must_use]
    pub const fn valid() -> Self {
        Self {
            issues: Vec::new(),
        }
    }

    /// Creates a result from issues.
    #[must_use]
    pub const fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            issues,
        }
    }

    /// Creates a failed result from a single issue.
    #[must_use]
    pub fn failure(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    /// Appends an issue.
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// True when no error-severity issues are present.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|issue| issue.severity == Severity::Error)
    }

    /// Iterates error-severity issues.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.severity == Severity::Error)
    }

    /// Iterates warning-severity issues.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.severity == Severity::Warning)
    }

    /// Iterates info-severity issues.
    pub fn infos(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.severity == Severity::Info)
    }

    /// Merges another result into this one.
    ///
    /// Issue order is this result's issues followed by `other`'s; validity of
    /// the merge is the conjunction of both inputs' validity.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.issues.extend(other.issues);
        self
    }

    /// Keeps only issues satisfying the predicate.
    #[must_use]
    pub fn filter(self, predicate: impl Fn(&ValidationIssue) -> bool) -> Self {
        Self {
            issues: self.issues.into_iter().filter(|issue| predicate(issue)).collect(),
        }
    }

    /// Groups issues by path.
    #[must_use]
    pub fn group_by_path(&self) -> BTreeMap<String, Vec<&ValidationIssue>> {
        let mut grouped: BTreeMap<String, Vec<&ValidationIssue>> = BTreeMap::new();
        for issue in &self.issues {
            grouped.entry(issue.path.clone()).or_default().push(issue);
        }
        grouped
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    /// Renders a machine-readable JSON report.
    #[must_use]
    pub fn to_json_report(&self) -> Value {
        json!({
            "valid": self.is_valid(),
            "errorCount": self.errors().count(),
            "warningCount": self.warnings().count(),
            "infoCount": self.infos().count(),
            "issues": self.issues,
        })
    }

    /// Renders a standalone HTML report.
    #[must_use]
    pub fn to_html_report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "<html><head><title>Validation Report</title></head><body>");
        let _ = writeln!(
            out,
            "<h1>Validation Report</h1><p>Status: {}</p>",
            if self.is_valid() { "valid" } else { "invalid" }
        );
        let _ = writeln!(out, "<table><tr><th>Severity</th><th>Code</th><th>Path</th><th>Message</th></tr>");
        for issue in &self.issues {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                issue.severity.as_str(),
                escape_html(&issue.code),
                escape_html(&issue.path),
                escape_html(&issue.message),
            );
        }
        let _ = writeln!(out, "</table></body></html>");
        out
    }

    /// Renders a detailed plain-text summary for operators.
    #[must_use]
    pub fn admin_summary(&self) -> String {
        let mut out = format!(
            "validation {}: {} error(s), {} warning(s), {} info\n",
            if self.is_valid() { "passed" } else { "failed" },
            self.errors().count(),
            self.warnings().count(),
            self.infos().count(),
        );
        for (path, issues) in self.group_by_path() {
            let _ = writeln!(out, "  {path}:");
            for issue in issues {
                let _ = writeln!(
                    out,
                    "    [{}] {}: {}",
                    issue.severity.as_str(),
                    issue.code,
                    issue.message
                );
            }
        }
        out
    }

    /// Renders a terse summary safe to show to clients.
    ///
    /// Codes and paths are included; messages and details are withheld.
    #[must_use]
    pub fn client_summary(&self) -> String {
        if self.is_valid() {
            return "configuration accepted".to_string();
        }
        let mut out = String::from("configuration rejected:");
        for issue in self.errors() {
            let _ = write!(out, " {}@{};", issue.code, issue.path);
        }
        out
    }
}

/// Escapes text for embedding in the HTML report.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

// ============================================================================
// SECTION: Batch Validation
// ============================================================================

/// Outcome of one item inside a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemOutcome {
    /// Zero-based index of the item in the batch.
    pub index: usize,
    /// Per-item validation result.
    pub result: ValidationResult,
}

/// Aggregate outcome of a batch validation run.
///
/// Individual failures never abort the batch; each item reports its own
/// result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of items processed.
    pub total: usize,
    /// Number of items whose result was valid.
    pub passed: usize,
    /// Number of items whose result was invalid.
    pub failed: usize,
    /// Per-item outcomes in input order.
    pub outcomes: Vec<BatchItemOutcome>,
}

impl BatchReport {
    /// Builds a report from per-item results in input order.
    #[must_use]
    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|result| result.is_valid()).count();
        let outcomes = results
            .into_iter()
            .enumerate()
            .map(|(index, result)| BatchItemOutcome {
                index,
                result,
            })
            .collect();
        Self {
            total,
            passed,
            failed: total - passed,
            outcomes,
        }
    }
}
