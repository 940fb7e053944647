// crates/backdrop-core/src/core/descriptor.rs
// ============================================================================
// Module: Backdrop Value Descriptors
// Description: Declarative value and condition descriptors for actions.
// Purpose: Define the wire schema the resolver evaluates against stores.
// Dependencies: crate::core::{keypath, scope, value}, serde
// ============================================================================

//! ## Overview
//! A value descriptor is a JSON-encoded recipe for producing a [`StoreValue`]
//! at execution time: a literal, a store read, a computed expression, or a
//! lookup into the triggering event's payload. Condition descriptors combine
//! comparisons over value descriptors with short-circuit logical operators.
//! Both are decoded from scenario documents and evaluated by the runtime
//! resolver; this module only defines the shapes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::keypath::KeyPath;
use crate::core::scope::ScenarioId;
use crate::core::scope::Scope;
use crate::core::scope::Storage;
use crate::core::scope::StoreKey;
use crate::core::value::StoreValue;
use crate::core::value::ValueKind;

// ============================================================================
// SECTION: Store References
// ============================================================================

/// Scope selector inside a store reference.
///
/// The concrete scenario identifier is supplied by the execution context, so
/// descriptors stay portable across scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScopeSelector {
    /// Application scope.
    App,
    /// Scope of the currently executing scenario.
    #[default]
    Scenario,
}

/// Reference to a store used by descriptors and actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoreRef {
    /// Scope selector, defaulting to the current scenario.
    #[serde(default)]
    pub scope: ScopeSelector,
    /// Storage backing, defaulting to memory.
    #[serde(default)]
    pub storage: StorageSelector,
}

/// Storage selector inside a store reference.
///
/// Serializes in the tagged object form. Deserialization also accepts the
/// bare string spellings (`"memory"`, `"userPrefs"`, `"session"`) used by
/// scenario documents for the unparameterized backings; `file` and
/// `backend` always need the object form to carry their parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StorageSelector {
    /// Volatile in-process storage.
    #[default]
    Memory,
    /// User-preferences storage.
    UserPrefs {
        /// Optional preferences suite name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suite: Option<String>,
    },
    /// File storage at an explicit location.
    File {
        /// File URL the store persists to.
        url: url::Url,
    },
    /// Scenario-session storage.
    Session,
    /// Remote backend storage.
    Backend {
        /// Remote namespace for the store.
        namespace: String,
    },
}

/// Tagged mirror of [`StorageSelector`] used for object-form decoding.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum TaggedStorageSelector {
    /// Volatile in-process storage.
    Memory,
    /// User-preferences storage.
    UserPrefs {
        /// Optional preferences suite name.
        #[serde(default)]
        suite: Option<String>,
    },
    /// File storage at an explicit location.
    File {
        /// File URL the store persists to.
        url: url::Url,
    },
    /// Scenario-session storage.
    Session,
    /// Remote backend storage.
    Backend {
        /// Remote namespace for the store.
        namespace: String,
    },
}

impl From<TaggedStorageSelector> for StorageSelector {
    fn from(tagged: TaggedStorageSelector) -> Self {
        match tagged {
            TaggedStorageSelector::Memory => Self::Memory,
            TaggedStorageSelector::UserPrefs {
                suite,
            } => Self::UserPrefs {
                suite,
            },
            TaggedStorageSelector::File {
                url,
            } => Self::File {
                url,
            },
            TaggedStorageSelector::Session => Self::Session,
            TaggedStorageSelector::Backend {
                namespace,
            } => Self::Backend {
                namespace,
            },
        }
    }
}

impl<'de> serde::Deserialize<'de> for StorageSelector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        match &raw {
            Value::String(tag) => match tag.as_str() {
                "memory" => Ok(Self::Memory),
                "userPrefs" => Ok(Self::UserPrefs {
                    suite: None,
                }),
                "session" => Ok(Self::Session),
                other => Err(serde::de::Error::custom(format!(
                    "storage `{other}` requires the object form with its parameters"
                ))),
            },
            Value::Object(_) => TaggedStorageSelector::deserialize(raw)
                .map(Self::from)
                .map_err(serde::de::Error::custom),
            _ => Err(serde::de::Error::custom("storage must be a string or object")),
        }
    }
}

impl StoreRef {
    /// Resolves the reference against the executing scenario.
    #[must_use]
    pub fn resolve(&self, scenario_id: &ScenarioId) -> StoreKey {
        let scope = match self.scope {
            ScopeSelector::App => Scope::App,
            ScopeSelector::Scenario => Scope::scenario(scenario_id.clone()),
        };
        let storage = match &self.storage {
            StorageSelector::Memory => Storage::Memory,
            StorageSelector::UserPrefs {
                suite,
            } => Storage::UserPrefs {
                suite: suite.clone(),
            },
            StorageSelector::File {
                url,
            } => Storage::File {
                url: url.clone(),
            },
            StorageSelector::Session => Storage::Session,
            StorageSelector::Backend {
                namespace,
            } => Storage::backend(namespace.clone()),
        };
        StoreKey::new(scope, storage)
    }
}

// ============================================================================
// SECTION: Computed Operators
// ============================================================================

/// Operator applied by a computed descriptor.
///
/// # Invariants
/// - Variants are stable for serialization and scenario decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputedOp {
    /// Numeric addition.
    Add,
    /// Numeric subtraction.
    Subtract,
    /// Numeric multiplication.
    Multiply,
    /// Numeric division; always promotes to a double.
    Divide,
    /// Numeric remainder.
    Modulo,
    /// String template substitution over `{i}` placeholders.
    Template,
}

// ============================================================================
// SECTION: Value Descriptors
// ============================================================================

/// Declarative recipe for a runtime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValueDescriptor {
    /// Inline literal decoded against a declared kind.
    Literal {
        /// Declared value kind.
        #[serde(rename = "type")]
        kind: ValueKind,
        /// Raw JSON payload decoded per the kind.
        value: Value,
    },
    /// Read from a store at a key path.
    StoreValue {
        /// Store the value is read from.
        #[serde(default, rename = "storeRef")]
        store_ref: StoreRef,
        /// Path to read.
        #[serde(rename = "keyPath")]
        key_path: KeyPath,
        /// Fallback literal when the path is absent.
        #[serde(default, rename = "defaultValue", skip_serializing_if = "Option::is_none")]
        default_value: Option<StoreValue>,
    },
    /// Computed expression over resolved operands.
    Computed {
        /// Operator to apply.
        op: ComputedOp,
        /// Operand descriptors, resolved in order.
        operands: Vec<ValueDescriptor>,
        /// Template string for [`ComputedOp::Template`].
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template: Option<String>,
    },
    /// Lookup into the triggering event payload by dotted path.
    EventData {
        /// Dotted path into the event payload.
        path: String,
    },
}

impl ValueDescriptor {
    /// Convenience constructor for a boolean literal.
    #[must_use]
    pub fn literal_bool(flag: bool) -> Self {
        Self::Literal {
            kind: ValueKind::Bool,
            value: Value::Bool(flag),
        }
    }

    /// Convenience constructor for a string literal.
    #[must_use]
    pub fn literal_string(text: impl Into<String>) -> Self {
        Self::Literal {
            kind: ValueKind::String,
            value: Value::String(text.into()),
        }
    }

    /// Convenience constructor for a store read with defaults.
    #[must_use]
    pub fn store(key_path: impl Into<KeyPath>) -> Self {
        Self::StoreValue {
            store_ref: StoreRef::default(),
            key_path: key_path.into(),
            default_value: None,
        }
    }
}

// ============================================================================
// SECTION: Condition Descriptors
// ============================================================================

/// Boolean-valued expression over value descriptors.
///
/// Comparisons use structural, tag-sensitive equality; ordering comparisons
/// are defined only when both sides resolve to numeric values. Logical
/// operators short-circuit left to right; `not` negates its first nested
/// condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConditionDescriptor {
    /// Structural equality.
    Equals {
        /// Left operand.
        left: ValueDescriptor,
        /// Right operand.
        right: ValueDescriptor,
    },
    /// Structural inequality.
    NotEquals {
        /// Left operand.
        left: ValueDescriptor,
        /// Right operand.
        right: ValueDescriptor,
    },
    /// Numeric strict greater-than.
    GreaterThan {
        /// Left operand.
        left: ValueDescriptor,
        /// Right operand.
        right: ValueDescriptor,
    },
    /// Numeric greater-than-or-equal.
    GreaterThanOrEqual {
        /// Left operand.
        left: ValueDescriptor,
        /// Right operand.
        right: ValueDescriptor,
    },
    /// Numeric strict less-than.
    LessThan {
        /// Left operand.
        left: ValueDescriptor,
        /// Right operand.
        right: ValueDescriptor,
    },
    /// Numeric less-than-or-equal.
    LessThanOrEqual {
        /// Left operand.
        left: ValueDescriptor,
        /// Right operand.
        right: ValueDescriptor,
    },
    /// Conjunction over nested conditions.
    And {
        /// Nested conditions, evaluated left to right.
        conditions: Vec<ConditionDescriptor>,
    },
    /// Disjunction over nested conditions.
    Or {
        /// Nested conditions, evaluated left to right.
        conditions: Vec<ConditionDescriptor>,
    },
    /// Negation of the first nested condition.
    Not {
        /// Nested conditions; only the first is evaluated.
        conditions: Vec<ConditionDescriptor>,
    },
}
