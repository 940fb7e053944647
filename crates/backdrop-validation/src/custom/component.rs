// crates/backdrop-validation/src/custom/component.rs
// ============================================================================
// Module: Backdrop Component-Type Validator
// Description: Allowlist gate over scenario component trees.
// Purpose: Reject component types the client cannot render, with security
//          screening of component props.
// Dependencies: crate::{custom, result}, serde_json
// ============================================================================

//! ## Overview
//! The store/action runtime treats component trees as opaque, but the gate in
//! front of it does not: every node's `type` must be on the allowlist, and
//! `props` are screened with the security validator before the tree reaches
//! the renderer. Children are walked recursively under their JSON paths.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Value;

use crate::custom::CustomValidator;
use crate::custom::security::SecurityValidator;
use crate::result::Severity;
use crate::result::ValidationIssue;
use crate::result::ValidationResult;

// ============================================================================
// SECTION: Issue Codes
// ============================================================================

/// Component `type` is not on the allowlist.
pub const CODE_COMPONENT_TYPE_UNKNOWN: &str = "COMPONENT_TYPE_UNKNOWN";
/// Component node is missing a string `type`.
pub const CODE_COMPONENT_TYPE_MISSING: &str = "COMPONENT_TYPE_MISSING";

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Component-type allowlist validator.
pub struct ComponentTypeValidator {
    /// Accepted component type strings.
    allowed: BTreeSet<String>,
    /// Security screen applied to component props.
    security: SecurityValidator,
}

impl ComponentTypeValidator {
    /// Creates a validator from an allowlist, with the strict security screen.
    #[must_use]
    pub fn new(allowed: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
            security: SecurityValidator::strict(),
        }
    }

    /// Walks one component node.
    fn walk(&self, node: &Value, path: &str, result: &mut ValidationResult) {
        let Value::Object(map) = node else {
            return;
        };
        match map.get("type") {
            Some(Value::String(component_type)) => {
                if !self.allowed.contains(component_type) {
                    result.push(ValidationIssue::new(
                        CODE_COMPONENT_TYPE_UNKNOWN,
                        format!("unknown component type: {component_type}"),
                        format!("{path}.type"),
                        Severity::Error,
                    ));
                }
            }
            _ => {
                result.push(ValidationIssue::new(
                    CODE_COMPONENT_TYPE_MISSING,
                    "component node has no string `type`".to_string(),
                    path,
                    Severity::Error,
                ));
            }
        }
        if let Some(props) = map.get("props") {
            let screened = self.security.validate(props, &format!("{path}.props"));
            *result = std::mem::take(result).merge(screened);
        }
        if let Some(Value::Array(children)) = map.get("children") {
            for (index, child) in children.iter().enumerate() {
                self.walk(child, &format!("{path}.children[{index}]"), result);
            }
        }
    }
}

impl CustomValidator for ComponentTypeValidator {
    fn name(&self) -> &str {
        "component-type"
    }

    fn validate(&self, value: &Value, path: &str) -> ValidationResult {
        let mut result = ValidationResult::valid();
        match value {
            Value::Array(nodes) => {
                for (index, node) in nodes.iter().enumerate() {
                    self.walk(node, &format!("{path}[{index}]"), &mut result);
                }
            }
            node => self.walk(node, path, &mut result),
        }
        result
    }
}
