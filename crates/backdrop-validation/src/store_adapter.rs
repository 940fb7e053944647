// crates/backdrop-validation/src/store_adapter.rs
// ============================================================================
// Module: Backdrop Store Validation Adapter
// Description: Bridges per-path store rules to the schema engine.
// Purpose: Decide store writes under strict or lenient validation.
// Dependencies: backdrop-core, crate::{engine, result, schema}, serde_json
// ============================================================================

//! ## Overview
//! Stores are configured with per-path [`ValidationRule`]s rather than full
//! schemas. The adapter translates a rule into an ad-hoc [`Schema`],
//! delegates to the engine, and applies the lenient-mode ladder: accept the
//! original, coerce to the rule's kind, substitute the default, or drop the
//! write. `validate_change` walks a change's patches in order; under strict
//! mode one failing patch rejects the whole change.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use backdrop_core::Change;
use backdrop_core::KeyPath;
use backdrop_core::StoreValue;
use backdrop_core::ValueKind;
use serde::Deserialize;
use serde::Serialize;

use crate::engine::SchemaValidator;
use crate::result::Severity;
use crate::result::ValidationIssue;
use crate::result::ValidationResult;
use crate::schema::Schema;
use crate::schema::SchemaNode;
use crate::schema::SchemaType;
use crate::schema::StringFormat;

// ============================================================================
// SECTION: Rules and Options
// ============================================================================

/// Validation mode for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Reject invalid writes.
    #[default]
    Strict,
    /// Coerce or default invalid writes; drop when neither applies.
    Lenient,
}

/// Per-path store validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    /// Required value kind at the path.
    pub kind: ValueKind,
    /// Whether the path must be present (checked by `validate_change` on
    /// removals).
    #[serde(default)]
    pub required: bool,
    /// Lenient-mode fallback value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<StoreValue>,
    /// Minimum: numeric value, string length, or array length per kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum: numeric value, string length, or array length per kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regular-expression constraint for string-family kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ValidationRule {
    /// Creates a rule constraining only the kind.
    #[must_use]
    pub const fn of_kind(kind: ValueKind) -> Self {
        Self {
            kind,
            required: false,
            default_value: None,
            min: None,
            max: None,
            pattern: None,
        }
    }
}

/// Store validation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValidationOptions {
    /// Strict or lenient mode.
    #[serde(default)]
    pub mode: ValidationMode,
    /// Rules keyed by path.
    #[serde(default)]
    pub schema: BTreeMap<KeyPath, ValidationRule>,
}

// ============================================================================
// SECTION: Write Decisions
// ============================================================================

/// Outcome of gating one store write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteDecision {
    /// Write proceeds with this value (original, coerced, or defaulted).
    Allow(StoreValue),
    /// Strict-mode rejection; the store surfaces the failure.
    Reject(ValidationResult),
    /// Lenient-mode drop; the store logs and skips the write.
    Drop(ValidationResult),
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Bridge between per-path rules and the schema engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreRuleAdapter {
    /// Engine used for rule evaluation.
    engine: SchemaValidator,
}

impl StoreRuleAdapter {
    /// Creates an adapter with an explicit engine.
    #[must_use]
    pub const fn new(engine: SchemaValidator) -> Self {
        Self {
            engine,
        }
    }

    /// Validates a value against one rule.
    #[must_use]
    pub fn validate_value(
        &self,
        rule: &ValidationRule,
        value: &StoreValue,
        path: &KeyPath,
    ) -> ValidationResult {
        // The engine works on bare JSON; color/url tags collapse to strings,
        // so the schema carries their shape constraints instead.
        let mut result =
            self.engine.validate(&value.to_bare(), &Schema::from_root(schema_for_rule(rule)));
        if !value.is_of_kind(rule.kind) && kind_conflicts(rule.kind, value) {
            result.push(ValidationIssue::new(
                "KIND_MISMATCH",
                format!("expected {} at {path}, got {}", rule.kind, value.kind()),
                path.as_str(),
                Severity::Error,
            ));
        }
        result
    }

    /// Gates one write under the configured options.
    #[must_use]
    pub fn decide_write(
        &self,
        options: &ValidationOptions,
        path: &KeyPath,
        value: StoreValue,
    ) -> WriteDecision {
        let Some(rule) = options.schema.get(path) else {
            return WriteDecision::Allow(value);
        };
        let result = self.validate_value(rule, &value, path);
        if result.is_valid() {
            return WriteDecision::Allow(value);
        }
        match options.mode {
            ValidationMode::Strict => WriteDecision::Reject(result),
            ValidationMode::Lenient => {
                if let Some(coerced) = value.coerce(rule.kind) {
                    let recheck = self.validate_value(rule, &coerced, path);
                    if recheck.is_valid() {
                        return WriteDecision::Allow(coerced);
                    }
                }
                rule.default_value.clone().map_or_else(
                    || WriteDecision::Drop(result.clone()),
                    WriteDecision::Allow,
                )
            }
        }
    }

    /// Validates a whole change's patches in order.
    ///
    /// Under strict mode the first failing patch makes the aggregate result
    /// invalid, rejecting the change as a unit.
    #[must_use]
    pub fn validate_change(&self, options: &ValidationOptions, change: &Change) -> ValidationResult {
        let mut aggregate = ValidationResult::valid();
        for patch in &change.patches {
            let Some(rule) = options.schema.get(&patch.key_path) else {
                continue;
            };
            match &patch.new_value {
                Some(value) => {
                    aggregate =
                        aggregate.merge(self.validate_value(rule, value, &patch.key_path));
                }
                None if rule.required => {
                    aggregate.push(ValidationIssue::new(
                        "REQUIRED_MISSING",
                        format!("required path {} cannot be removed", patch.key_path),
                        patch.key_path.as_str(),
                        Severity::Error,
                    ));
                }
                None => {}
            }
        }
        aggregate
    }
}

// ============================================================================
// SECTION: Rule Translation
// ============================================================================

/// Translates a per-path rule into an ad-hoc schema node.
#[must_use]
pub fn schema_for_rule(rule: &ValidationRule) -> SchemaNode {
    let mut node = SchemaNode::default();
    match rule.kind {
        ValueKind::String => {
            node.schema_type = Some(SchemaType::String);
            node.min_length = rule.min.map(to_length);
            node.max_length = rule.max.map(to_length);
        }
        ValueKind::Number => {
            node.schema_type = Some(SchemaType::Number);
            node.minimum = rule.min;
            node.maximum = rule.max;
        }
        ValueKind::Integer => {
            node.schema_type = Some(SchemaType::Integer);
            node.minimum = rule.min;
            node.maximum = rule.max;
        }
        ValueKind::Bool => node.schema_type = Some(SchemaType::Bool),
        ValueKind::Color => {
            node.schema_type = Some(SchemaType::String);
            node.pattern = Some("^#([0-9a-fA-F]{6}|[0-9a-fA-F]{8})$".to_string());
        }
        ValueKind::Url => {
            node.schema_type = Some(SchemaType::String);
            node.format = Some(StringFormat::Uri);
        }
        ValueKind::Array => {
            node.schema_type = Some(SchemaType::Array);
            node.min_items = rule.min.map(to_length);
            node.max_items = rule.max.map(to_length);
        }
        ValueKind::Object => node.schema_type = Some(SchemaType::Object),
        ValueKind::Null => node.schema_type = Some(SchemaType::Null),
    }
    if node.pattern.is_none() {
        node.pattern.clone_from(&rule.pattern);
    }
    node
}

/// True when the value's tag cannot satisfy the rule kind even structurally.
///
/// Color and URL values collapse to strings in bare form, so a string rule is
/// satisfied by either; any other tag disagreement is a conflict.
fn kind_conflicts(expected: ValueKind, value: &StoreValue) -> bool {
    match (expected, value.kind()) {
        (ValueKind::String, ValueKind::Color | ValueKind::Url)
        | (ValueKind::Color | ValueKind::Url, ValueKind::String)
        | (ValueKind::Number, ValueKind::Integer) => false,
        (expected_kind, got) => expected_kind != got,
    }
}

/// Converts a rule bound to a length constraint.
fn to_length(bound: f64) -> usize {
    if bound <= 0.0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, reason = "length bounds are small integers")]
    #[allow(clippy::cast_sign_loss, reason = "negative bounds are clamped above")]
    let length = bound as usize;
    length
}
