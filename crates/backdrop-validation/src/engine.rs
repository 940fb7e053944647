// crates/backdrop-validation/src/engine.rs
// ============================================================================
// Module: Backdrop Schema Validation Engine
// Description: Depth- and budget-limited schema traversal over JSON values.
// Purpose: Gate inbound configuration before it reaches stores or renderers.
// Dependencies: crate::{formats, result, schema}, regex, serde_json
// ============================================================================

//! ## Overview
//! The engine walks a value against a [`Schema`], accumulating issues. Two
//! limits bound hostile inputs: a traversal depth limit (default 10) and an
//! issue budget (default 100). Exceeding either appends one terminal issue
//! and stops the walk. Engine-internal problems (an unresolvable `$ref`, a
//! malformed `pattern`) are captured as issues, never panics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;
use serde_json::Value;
use serde_json::json;

use crate::formats::matches_format;
use crate::result::BatchReport;
use crate::result::Severity;
use crate::result::ValidationIssue;
use crate::result::ValidationResult;
use crate::schema::AdditionalProperties;
use crate::schema::Schema;
use crate::schema::SchemaNode;

// ============================================================================
// SECTION: Issue Codes
// ============================================================================

/// Value failed the `type` constraint.
pub const CODE_TYPE_MISMATCH: &str = "TYPE_MISMATCH";
/// Value is not an enumeration member.
pub const CODE_ENUM_MISMATCH: &str = "ENUM_MISMATCH";
/// Value differs from the `const` constraint.
pub const CODE_CONST_MISMATCH: &str = "CONST_MISMATCH";
/// No `anyOf` branch accepted the value.
pub const CODE_ANY_OF_FAILED: &str = "ANY_OF_FAILED";
/// Not exactly one `oneOf` branch accepted the value.
pub const CODE_ONE_OF_FAILED: &str = "ONE_OF_FAILED";
/// The `not` schema accepted the value.
pub const CODE_NOT_FAILED: &str = "NOT_FAILED";
/// String shorter than `minLength`.
pub const CODE_MIN_LENGTH: &str = "MIN_LENGTH";
/// String longer than `maxLength`.
pub const CODE_MAX_LENGTH: &str = "MAX_LENGTH";
/// String does not match `pattern`.
pub const CODE_PATTERN_MISMATCH: &str = "PATTERN_MISMATCH";
/// String does not match the named `format`.
pub const CODE_FORMAT_INVALID: &str = "FORMAT_INVALID";
/// Number below `minimum`.
pub const CODE_MINIMUM: &str = "MINIMUM";
/// Number above `maximum`.
pub const CODE_MAXIMUM: &str = "MAXIMUM";
/// Array shorter than `minItems`.
pub const CODE_MIN_ITEMS: &str = "MIN_ITEMS";
/// Array longer than `maxItems`.
pub const CODE_MAX_ITEMS: &str = "MAX_ITEMS";
/// Required object property missing.
pub const CODE_REQUIRED_MISSING: &str = "REQUIRED_MISSING";
/// Undeclared property present with `additionalProperties: false`.
pub const CODE_ADDITIONAL_PROPERTY: &str = "ADDITIONAL_PROPERTY";
/// `$ref` pointer did not resolve.
pub const CODE_REF_UNRESOLVED: &str = "REF_UNRESOLVED";
/// Schema itself is malformed (for example an invalid `pattern`).
pub const CODE_SCHEMA_INVALID: &str = "SCHEMA_INVALID";
/// Traversal depth limit reached; walk stopped.
pub const CODE_DEPTH_LIMIT: &str = "DEPTH_LIMIT";
/// Issue budget exhausted; walk stopped.
pub const CODE_ERROR_LIMIT: &str = "ERROR_LIMIT";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Engine limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Maximum traversal depth before the walk stops.
    pub max_depth: usize,
    /// Maximum number of issues before the walk stops.
    pub max_errors: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_errors: 100,
        }
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Schema validation engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator {
    /// Engine limits applied to every walk.
    config: ValidatorConfig,
}

impl SchemaValidator {
    /// Creates an engine with explicit limits.
    #[must_use]
    pub const fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
        }
    }

    /// Validates a value against a schema.
    #[must_use]
    pub fn validate(&self, value: &Value, schema: &Schema) -> ValidationResult {
        let mut walker = Walker {
            schema,
            config: &self.config,
            issues: Vec::new(),
            halted: false,
        };
        walker.walk(&schema.root, value, "$", 0);
        ValidationResult::from_issues(walker.issues)
    }

    /// Validates a batch of values, one result per item.
    ///
    /// Individual failures are captured per item and never abort the batch.
    #[must_use]
    pub fn validate_batch(&self, items: &[Value], schema: &Schema) -> BatchReport {
        let results = items.iter().map(|item| self.validate(item, schema)).collect();
        BatchReport::from_results(results)
    }
}

// ============================================================================
// SECTION: Walker
// ============================================================================

/// Single-walk state: issues found so far and the halt flag.
struct Walker<'walk> {
    /// Schema providing `$ref` definitions.
    schema: &'walk Schema,
    /// Engine limits.
    config: &'walk ValidatorConfig,
    /// Issues in discovery order.
    issues: Vec<ValidationIssue>,
    /// Set once a terminal limit issue has been appended.
    halted: bool,
}

impl Walker<'_> {
    /// Appends an issue, enforcing the issue budget.
    fn push(&mut self, issue: ValidationIssue) {
        if self.halted {
            return;
        }
        if self.issues.len() >= self.config.max_errors {
            self.issues.push(ValidationIssue::new(
                CODE_ERROR_LIMIT,
                format!("issue budget of {} exhausted; validation stopped", self.config.max_errors),
                issue.path.clone(),
                Severity::Error,
            ));
            self.halted = true;
            return;
        }
        self.issues.push(issue);
    }

    /// Walks one schema node against one value.
    fn walk(&mut self, node: &SchemaNode, value: &Value, path: &str, depth: usize) {
        if self.halted {
            return;
        }
        if depth > self.config.max_depth {
            self.push(ValidationIssue::new(
                CODE_DEPTH_LIMIT,
                format!("depth limit of {} exceeded; validation stopped", self.config.max_depth),
                path,
                Severity::Error,
            ));
            self.halted = true;
            return;
        }

        if let Some(reference) = &node.reference {
            match self.schema.resolve(reference) {
                Some(target) => self.walk(target, value, path, depth + 1),
                None => self.push(ValidationIssue::new(
                    CODE_REF_UNRESOLVED,
                    format!("unresolvable schema reference: {reference}"),
                    path,
                    Severity::Error,
                )),
            }
            return;
        }

        self.check_type(node, value, path);
        self.check_enum_const(node, value, path);
        self.check_combinators(node, value, path, depth);
        self.check_string(node, value, path);
        self.check_number(node, value, path);
        self.check_array(node, value, path, depth);
        self.check_object(node, value, path, depth);
    }

    /// Enforces the `type` constraint.
    fn check_type(&mut self, node: &SchemaNode, value: &Value, path: &str) {
        if let Some(schema_type) = node.schema_type
            && !schema_type.accepts(value)
        {
            self.push(
                ValidationIssue::new(
                    CODE_TYPE_MISMATCH,
                    format!("expected {}, got {}", schema_type.as_str(), type_name(value)),
                    path,
                    Severity::Error,
                )
                .with_details(json!({"expected": schema_type.as_str(), "got": type_name(value)})),
            );
        }
    }

    /// Enforces `enum` and `const`.
    fn check_enum_const(&mut self, node: &SchemaNode, value: &Value, path: &str) {
        if let Some(members) = &node.enumeration
            && !members.contains(value)
        {
            self.push(ValidationIssue::new(
                CODE_ENUM_MISMATCH,
                "value is not a member of the enumeration".to_string(),
                path,
                Severity::Error,
            ));
        }
        if let Some(constant) = &node.constant
            && value != constant
        {
            self.push(ValidationIssue::new(
                CODE_CONST_MISMATCH,
                "value does not equal the declared constant".to_string(),
                path,
                Severity::Error,
            ));
        }
    }

    /// Enforces the `allOf`/`anyOf`/`oneOf`/`not` combinators.
    fn check_combinators(&mut self, node: &SchemaNode, value: &Value, path: &str, depth: usize) {
        for branch in &node.all_of {
            self.walk(branch, value, path, depth + 1);
        }
        if !node.any_of.is_empty() {
            let accepted =
                node.any_of.iter().filter(|branch| self.probe(branch, value, depth + 1)).count();
            if accepted == 0 {
                self.push(ValidationIssue::new(
                    CODE_ANY_OF_FAILED,
                    format!("no anyOf branch of {} accepted the value", node.any_of.len()),
                    path,
                    Severity::Error,
                ));
            }
        }
        if !node.one_of.is_empty() {
            let accepted =
                node.one_of.iter().filter(|branch| self.probe(branch, value, depth + 1)).count();
            if accepted != 1 {
                self.push(
                    ValidationIssue::new(
                        CODE_ONE_OF_FAILED,
                        format!("expected exactly one oneOf branch to accept, got {accepted}"),
                        path,
                        Severity::Error,
                    )
                    .with_details(json!({"accepted": accepted})),
                );
            }
        }
        if let Some(negated) = &node.not
            && self.probe(negated, value, depth + 1)
        {
            self.push(ValidationIssue::new(
                CODE_NOT_FAILED,
                "value matches a schema it must not match".to_string(),
                path,
                Severity::Error,
            ));
        }
    }

    /// Enforces string constraints when the value is a string.
    fn check_string(&mut self, node: &SchemaNode, value: &Value, path: &str) {
        let Value::String(text) = value else {
            return;
        };
        let length = text.chars().count();
        if let Some(min) = node.min_length
            && length < min
        {
            self.push(ValidationIssue::new(
                CODE_MIN_LENGTH,
                format!("string length {length} is below the minimum {min}"),
                path,
                Severity::Error,
            ));
        }
        if let Some(max) = node.max_length
            && length > max
        {
            self.push(ValidationIssue::new(
                CODE_MAX_LENGTH,
                format!("string length {length} exceeds the maximum {max}"),
                path,
                Severity::Error,
            ));
        }
        if let Some(pattern) = &node.pattern {
            match Regex::new(pattern) {
                Ok(regex) => {
                    if !regex.is_match(text) {
                        self.push(ValidationIssue::new(
                            CODE_PATTERN_MISMATCH,
                            format!("string does not match pattern {pattern}"),
                            path,
                            Severity::Error,
                        ));
                    }
                }
                Err(err) => self.push(ValidationIssue::new(
                    CODE_SCHEMA_INVALID,
                    format!("invalid pattern {pattern}: {err}"),
                    path,
                    Severity::Error,
                )),
            }
        }
        if let Some(format) = node.format
            && !matches_format(format, text)
        {
            self.push(ValidationIssue::new(
                CODE_FORMAT_INVALID,
                "string does not match the declared format".to_string(),
                path,
                Severity::Error,
            ));
        }
    }

    /// Enforces numeric bounds when the value is a number.
    fn check_number(&mut self, node: &SchemaNode, value: &Value, path: &str) {
        let Some(number) = value.as_f64() else {
            return;
        };
        if let Some(minimum) = node.minimum
            && number < minimum
        {
            self.push(ValidationIssue::new(
                CODE_MINIMUM,
                format!("{number} is below the minimum {minimum}"),
                path,
                Severity::Error,
            ));
        }
        if let Some(maximum) = node.maximum
            && number > maximum
        {
            self.push(ValidationIssue::new(
                CODE_MAXIMUM,
                format!("{number} exceeds the maximum {maximum}"),
                path,
                Severity::Error,
            ));
        }
    }

    /// Enforces array constraints and walks `items`.
    fn check_array(&mut self, node: &SchemaNode, value: &Value, path: &str, depth: usize) {
        let Value::Array(items) = value else {
            return;
        };
        if let Some(min) = node.min_items
            && items.len() < min
        {
            self.push(ValidationIssue::new(
                CODE_MIN_ITEMS,
                format!("array length {} is below the minimum {min}", items.len()),
                path,
                Severity::Error,
            ));
        }
        if let Some(max) = node.max_items
            && items.len() > max
        {
            self.push(ValidationIssue::new(
                CODE_MAX_ITEMS,
                format!("array length {} exceeds the maximum {max}", items.len()),
                path,
                Severity::Error,
            ));
        }
        if let Some(item_schema) = &node.items {
            for (index, item) in items.iter().enumerate() {
                self.walk(item_schema, item, &format!("{path}[{index}]"), depth + 1);
            }
        }
    }

    /// Enforces object constraints and walks `properties`.
    fn check_object(&mut self, node: &SchemaNode, value: &Value, path: &str, depth: usize) {
        let Value::Object(map) = value else {
            return;
        };
        for name in &node.required {
            if !map.contains_key(name) {
                self.push(ValidationIssue::new(
                    CODE_REQUIRED_MISSING,
                    format!("required property `{name}` is missing"),
                    path,
                    Severity::Error,
                ));
            }
        }
        for (name, child) in map {
            let child_path = format!("{path}.{name}");
            if let Some(declared) = node.properties.get(name) {
                self.walk(declared, child, &child_path, depth + 1);
                continue;
            }
            match &node.additional_properties {
                Some(AdditionalProperties::Allowed(false)) => {
                    self.push(ValidationIssue::new(
                        CODE_ADDITIONAL_PROPERTY,
                        format!("undeclared property `{name}` is not allowed"),
                        &child_path,
                        Severity::Error,
                    ));
                }
                Some(AdditionalProperties::Schema(extra)) => {
                    self.walk(extra, child, &child_path, depth + 1);
                }
                Some(AdditionalProperties::Allowed(true)) | None => {}
            }
        }
    }

    /// Runs a sub-walk and reports whether it produced no errors.
    ///
    /// Probes use a fresh issue buffer so combinator branches never consume
    /// the caller's budget.
    fn probe(&self, node: &SchemaNode, value: &Value, depth: usize) -> bool {
        let mut sub = Walker {
            schema: self.schema,
            config: self.config,
            issues: Vec::new(),
            halted: false,
        };
        sub.walk(node, value, "$", depth);
        !sub.issues.iter().any(|issue| issue.severity == Severity::Error)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Human-readable JSON type name for error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
