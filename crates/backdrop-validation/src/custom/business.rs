// crates/backdrop-validation/src/custom/business.rs
// ============================================================================
// Module: Backdrop Business Rules
// Description: Composable predicate rules with per-rule severity.
// Purpose: Express domain constraints a structural schema cannot.
// Dependencies: crate::{custom, result}, serde_json
// ============================================================================

//! ## Overview
//! A business rule is a named predicate over the validated value with its own
//! severity and message. Rules compose into arrays; every failing rule
//! contributes one issue, and severity decides whether the result stays
//! valid.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::custom::CustomValidator;
use crate::result::Severity;
use crate::result::ValidationIssue;
use crate::result::ValidationResult;

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Predicate evaluated by a business rule.
pub type RulePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Named business rule with severity and message.
#[derive(Clone)]
pub struct BusinessRule {
    /// Stable rule name, used as the issue code.
    pub code: String,
    /// Message emitted when the rule fails.
    pub message: String,
    /// Severity of a failure.
    pub severity: Severity,
    /// Predicate; `false` fails the rule.
    pub predicate: RulePredicate,
}

impl BusinessRule {
    /// Creates a rule from its parts.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            predicate: Arc::new(predicate),
        }
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validator running an ordered rule array.
#[derive(Clone, Default)]
pub struct BusinessRuleValidator {
    /// Rules evaluated in order.
    rules: Vec<BusinessRule>,
}

impl BusinessRuleValidator {
    /// Creates a validator from rules.
    #[must_use]
    pub fn new(rules: Vec<BusinessRule>) -> Self {
        Self {
            rules,
        }
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: BusinessRule) {
        self.rules.push(rule);
    }
}

impl CustomValidator for BusinessRuleValidator {
    fn name(&self) -> &str {
        "business-rules"
    }

    fn validate(&self, value: &Value, path: &str) -> ValidationResult {
        let mut result = ValidationResult::valid();
        for rule in &self.rules {
            if !(rule.predicate)(value) {
                result.push(ValidationIssue::new(
                    rule.code.clone(),
                    rule.message.clone(),
                    path,
                    rule.severity,
                ));
            }
        }
        result
    }
}
