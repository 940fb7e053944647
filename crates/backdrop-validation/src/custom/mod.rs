// crates/backdrop-validation/src/custom/mod.rs
// ============================================================================
// Module: Backdrop Custom Validators
// Description: Pluggable validator trait, registry, and built-ins.
// Purpose: Extend schema validation with business and security screens.
// Dependencies: crate::result, serde_json
// ============================================================================

//! ## Overview
//! Custom validators cover what a structural schema cannot: security screens
//! over untrusted strings, URL policy, color shapes, component-type
//! allowlists, and composable business rules. A registry maps names to
//! validators; each returns a plain [`ValidationResult`] and never panics.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod business;
pub mod color;
pub mod component;
pub mod security;
pub mod url;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::result::ValidationResult;

// ============================================================================
// SECTION: Validator Trait
// ============================================================================

/// Pluggable validator evaluated against a JSON value.
pub trait CustomValidator: Send + Sync {
    /// Stable registry name of the validator.
    fn name(&self) -> &str;

    /// Validates a value rooted at `path`.
    fn validate(&self, value: &Value, path: &str) -> ValidationResult;
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry mapping validator names to implementations.
#[derive(Default, Clone)]
pub struct ValidatorRegistry {
    /// Registered validators keyed by name.
    validators: BTreeMap<String, Arc<dyn CustomValidator>>,
}

impl ValidatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a validator under its own name, replacing any previous one.
    pub fn register(&mut self, validator: impl CustomValidator + 'static) {
        self.validators.insert(validator.name().to_string(), Arc::new(validator));
    }

    /// Returns the validator registered under a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn CustomValidator>> {
        self.validators.get(name).map(Arc::clone)
    }

    /// Runs one named validator; `None` when the name is unknown.
    #[must_use]
    pub fn validate_with(&self, name: &str, value: &Value, path: &str) -> Option<ValidationResult> {
        self.validators.get(name).map(|validator| validator.validate(value, path))
    }

    /// Runs every registered validator and merges the results.
    #[must_use]
    pub fn validate_all(&self, value: &Value, path: &str) -> ValidationResult {
        self.validators
            .values()
            .map(|validator| validator.validate(value, path))
            .fold(ValidationResult::valid(), ValidationResult::merge)
    }

    /// Returns the registered validator names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.validators.keys().map(String::as_str).collect()
    }
}
