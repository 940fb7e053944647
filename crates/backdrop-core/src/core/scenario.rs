// crates/backdrop-core/src/core/scenario.rs
// ============================================================================
// Module: Backdrop Scenario Documents
// Description: Inbound scenario document schema and decoding.
// Purpose: Decode scenario JSON into typed store descriptors and action trees.
// Dependencies: crate::core::{action, descriptor, keypath, value, version}, serde, serde_json
// ============================================================================

//! ## Overview
//! A scenario document carries the version, the store descriptors with their
//! initial values (in tagged form), the action tree, and an opaque component
//! tree the store/action runtime never interprets. Decoding is strict about
//! action kinds: an unknown tag fails with a typed error carrying the serde
//! position. Structural validation (duplicate action ids) runs after decode.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::action::Action;
use crate::core::action::ActionId;
use crate::core::descriptor::ScopeSelector;
use crate::core::descriptor::StorageSelector;
use crate::core::keypath::KeyPath;
use crate::core::value::StoreValue;
use crate::core::version::SemanticVersion;

// ============================================================================
// SECTION: Store Descriptors
// ============================================================================

/// Store declaration inside a scenario document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDescriptor {
    /// Scope selector for the store.
    #[serde(default)]
    pub scope: ScopeSelector,
    /// Storage backing for the store.
    #[serde(default)]
    pub storage: StorageSelector,
    /// Initial values keyed by path, in tagged form.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub initial_value: BTreeMap<KeyPath, StoreValue>,
}

// ============================================================================
// SECTION: Scenario Document
// ============================================================================

/// Decoded scenario document.
///
/// # Invariants
/// - `components` is opaque to the store/action runtime and passes through
///   untouched; only `stores` and `actions` are interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    /// Document semantic version.
    pub version: SemanticVersion,
    /// Store declarations materialized before actions run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stores: Vec<StoreDescriptor>,
    /// Root actions addressable by identifier.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    /// Opaque component tree for the rendering collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Value>,
}

impl ScenarioDocument {
    /// Decodes a scenario document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Decode`] with the offending position when the
    /// JSON is malformed or an action kind is unknown, and
    /// [`ScenarioError::DuplicateActionId`] when two root actions share an id.
    pub fn from_json_str(raw: &str) -> Result<Self, ScenarioError> {
        let document: Self = serde_json::from_str(raw).map_err(|err| ScenarioError::Decode {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        })?;
        document.validate()?;
        Ok(document)
    }

    /// Validates structural invariants after decode.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::DuplicateActionId`] when two root actions
    /// share an identifier.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut seen: Vec<&ActionId> = Vec::new();
        for action in &self.actions {
            let Some(id) = &action.id else {
                continue;
            };
            if seen.contains(&id) {
                return Err(ScenarioError::DuplicateActionId(id.to_string()));
            }
            seen.push(id);
        }
        Ok(())
    }

    /// Looks up a root action by identifier.
    #[must_use]
    pub fn action(&self, id: &ActionId) -> Option<&Action> {
        self.actions.iter().find(|action| action.id.as_ref() == Some(id))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Scenario decoding and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// JSON decode failure with the offending position.
    #[error("scenario decode error at line {line}, column {column}: {message}")]
    Decode {
        /// 1-based line of the failure.
        line: usize,
        /// 1-based column of the failure.
        column: usize,
        /// Underlying decoder message.
        message: String,
    },
    /// Two root actions share an identifier.
    #[error("duplicate action identifier: {0}")]
    DuplicateActionId(String),
}
