// crates/backdrop-core/src/core/scope.rs
// ============================================================================
// Module: Backdrop Scopes and Storage
// Description: Logical scope and physical storage tags for store instances.
// Purpose: Key store instances uniquely by (scope, storage) pairs.
// Dependencies: serde, url
// ============================================================================

//! ## Overview
//! A scope partitions store lifetime (`app` outlives every scenario;
//! `scenario` stores are dropped on cleanup or major-version bumps). Storage
//! selects the physical backing. Each `(scope, storage)` pair owns exactly
//! one store instance, cached by the manager.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Scenario identifier for scenario-scoped stores.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Creates a new scenario identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ScenarioId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ScenarioId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Scope
// ============================================================================

/// Logical store scope controlling lifetime.
///
/// # Invariants
/// - Variants are stable for serialization and store keying.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// Application-wide scope; survives scenario teardown.
    App,
    /// Scenario-bound scope; dropped on cleanup and major version bumps.
    Scenario {
        /// Scenario the scope is bound to.
        id: ScenarioId,
    },
}

impl Scope {
    /// Creates a scenario scope.
    #[must_use]
    pub fn scenario(id: impl Into<ScenarioId>) -> Self {
        Self::Scenario {
            id: id.into(),
        }
    }

    /// Returns the scenario identifier for scenario scopes.
    #[must_use]
    pub const fn scenario_id(&self) -> Option<&ScenarioId> {
        match self {
            Self::App => None,
            Self::Scenario {
                id,
            } => Some(id),
        }
    }

    /// Returns a stable string form used in persistence keys.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            Self::App => "app".to_string(),
            Self::Scenario {
                id,
            } => format!("scenario.{id}"),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

// ============================================================================
// SECTION: Storage
// ============================================================================

/// Physical storage backing for a store instance.
///
/// # Invariants
/// - Variants are stable for serialization and store keying.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Storage {
    /// Volatile in-process storage.
    Memory,
    /// User-preferences blob storage.
    UserPrefs {
        /// Optional preferences suite name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suite: Option<String>,
    },
    /// File storage at an explicit location.
    File {
        /// File URL the store persists to.
        url: Url,
    },
    /// Scenario-session storage, cleared on scenario end.
    Session,
    /// Remote backend storage under a namespace.
    Backend {
        /// Remote namespace for the store.
        namespace: String,
    },
}

impl Storage {
    /// Creates a user-preferences storage tag without a suite.
    #[must_use]
    pub const fn user_prefs() -> Self {
        Self::UserPrefs {
            suite: None,
        }
    }

    /// Creates a backend storage tag.
    #[must_use]
    pub fn backend(namespace: impl Into<String>) -> Self {
        Self::Backend {
            namespace: namespace.into(),
        }
    }

    /// Returns a stable label for logs and intents.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::UserPrefs {
                ..
            } => "userPrefs",
            Self::File {
                ..
            } => "file",
            Self::Session => "session",
            Self::Backend {
                ..
            } => "backend",
        }
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Store Keys
// ============================================================================

/// Unique key for a store instance.
///
/// # Invariants
/// - `get_store` returns the same instance for equal keys until reset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoreKey {
    /// Logical scope of the store.
    pub scope: Scope,
    /// Physical storage of the store.
    pub storage: Storage,
}

impl StoreKey {
    /// Creates a store key.
    #[must_use]
    pub const fn new(scope: Scope, storage: Storage) -> Self {
        Self {
            scope,
            storage,
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.storage)
    }
}
