// crates/backdrop-validation/src/custom/security.rs
// ============================================================================
// Module: Backdrop Security Validator
// Description: Screens untrusted configuration values for injection payloads.
// Purpose: Block XSS and traversal, flag SQL injection, bound input sizes.
// Dependencies: crate::{custom, result}, regex, serde_json
// ============================================================================

//! ## Overview
//! Scenario documents arrive from a remote backend and must be treated as
//! hostile. The security validator walks every string in a value tree and
//! blocks script injection and path traversal with error severity, flags
//! SQL-injection shapes with warning severity, and enforces string/array
//! length and object depth bounds. Patterns are compiled once at
//! construction; an uncompilable pattern is a programmer error surfaced as a
//! `SCHEMA_INVALID`-style issue rather than a panic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;
use serde_json::Value;
use serde_json::json;

use crate::custom::CustomValidator;
use crate::result::Severity;
use crate::result::ValidationIssue;
use crate::result::ValidationResult;

// ============================================================================
// SECTION: Issue Codes
// ============================================================================

/// Blocking security finding (XSS, traversal, bound violations).
pub const CODE_SECURITY_VIOLATION: &str = "SECURITY_VIOLATION";
/// Advisory security finding (SQL-injection shapes).
pub const CODE_SECURITY_THREAT: &str = "SECURITY_THREAT";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Bounds and toggles for the security screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// Maximum accepted string length in characters.
    pub max_string_length: usize,
    /// Maximum accepted array length.
    pub max_array_length: usize,
    /// Maximum accepted object nesting depth.
    pub max_object_depth: usize,
    /// Block script/markup injection patterns.
    pub block_xss: bool,
    /// Flag SQL-injection substrings as warnings.
    pub flag_sql_injection: bool,
    /// Block path-traversal sequences.
    pub block_path_traversal: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_string_length: 10_000,
            max_array_length: 1_000,
            max_object_depth: 20,
            block_xss: true,
            flag_sql_injection: true,
            block_path_traversal: true,
        }
    }
}

// ============================================================================
// SECTION: Pattern Tables
// ============================================================================

/// XSS pattern sources compiled at construction.
const XSS_PATTERNS: &[&str] = &[
    r"(?i)<\s*script",
    r"(?i)<\s*iframe",
    r"(?i)javascript\s*:",
    r"(?i)\bon[a-z]+\s*=",
    r"(?i)data\s*:\s*text/html",
];

/// SQL-injection substrings matched case-insensitively.
const SQLI_MARKERS: &[&str] = &[
    "union select",
    "drop table",
    "insert into",
    "delete from",
    "' or '",
    "\" or \"",
    "1=1",
    "--",
];

/// Path-traversal substrings matched case-insensitively.
const TRAVERSAL_MARKERS: &[&str] = &["../", "..\\", "%2e%2e"];

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Security screen over untrusted JSON value trees.
pub struct SecurityValidator {
    /// Bounds and toggles.
    config: SecurityConfig,
    /// Compiled XSS patterns.
    xss: Vec<Regex>,
}

impl SecurityValidator {
    /// Creates a validator with the given configuration.
    #[must_use]
    pub fn new(config: SecurityConfig) -> Self {
        let xss = XSS_PATTERNS.iter().filter_map(|pattern| Regex::new(pattern).ok()).collect();
        Self {
            config,
            xss,
        }
    }

    /// Creates a validator with default bounds.
    #[must_use]
    pub fn strict() -> Self {
        Self::new(SecurityConfig::default())
    }

    /// Walks a value tree, collecting findings.
    fn walk(&self, value: &Value, path: &str, depth: usize, result: &mut ValidationResult) {
        if depth > self.config.max_object_depth {
            result.push(ValidationIssue::new(
                CODE_SECURITY_VIOLATION,
                format!("nesting depth exceeds the bound of {}", self.config.max_object_depth),
                path,
                Severity::Error,
            ));
            return;
        }
        match value {
            Value::String(text) => self.screen_string(text, path, result),
            Value::Array(items) => {
                if items.len() > self.config.max_array_length {
                    result.push(ValidationIssue::new(
                        CODE_SECURITY_VIOLATION,
                        format!(
                            "array length {} exceeds the bound of {}",
                            items.len(),
                            self.config.max_array_length
                        ),
                        path,
                        Severity::Error,
                    ));
                }
                for (index, item) in items.iter().enumerate() {
                    self.walk(item, &format!("{path}[{index}]"), depth + 1, result);
                }
            }
            Value::Object(map) => {
                for (key, child) in map {
                    self.screen_string(key, path, result);
                    self.walk(child, &format!("{path}.{key}"), depth + 1, result);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    /// Screens one string against all configured pattern families.
    fn screen_string(&self, text: &str, path: &str, result: &mut ValidationResult) {
        if text.chars().count() > self.config.max_string_length {
            result.push(ValidationIssue::new(
                CODE_SECURITY_VIOLATION,
                format!("string length exceeds the bound of {}", self.config.max_string_length),
                path,
                Severity::Error,
            ));
        }
        if self.config.block_xss {
            for pattern in &self.xss {
                if pattern.is_match(text) {
                    result.push(
                        ValidationIssue::new(
                            CODE_SECURITY_VIOLATION,
                            "string contains a script-injection pattern".to_string(),
                            path,
                            Severity::Error,
                        )
                        .with_details(json!({"pattern": pattern.as_str()})),
                    );
                    break;
                }
            }
        }
        let lowered = text.to_lowercase();
        if self.config.block_path_traversal
            && TRAVERSAL_MARKERS.iter().any(|marker| lowered.contains(marker))
        {
            result.push(ValidationIssue::new(
                CODE_SECURITY_VIOLATION,
                "string contains a path-traversal sequence".to_string(),
                path,
                Severity::Error,
            ));
        }
        if self.config.flag_sql_injection
            && let Some(marker) = SQLI_MARKERS.iter().find(|marker| lowered.contains(*marker))
        {
            result.push(
                ValidationIssue::new(
                    CODE_SECURITY_THREAT,
                    "string contains a SQL-injection shape".to_string(),
                    path,
                    Severity::Warning,
                )
                .with_details(json!({"marker": marker})),
            );
        }
    }
}

impl CustomValidator for SecurityValidator {
    fn name(&self) -> &str {
        "security"
    }

    fn validate(&self, value: &Value, path: &str) -> ValidationResult {
        let mut result = ValidationResult::valid();
        self.walk(value, path, 0, &mut result);
        result
    }
}
