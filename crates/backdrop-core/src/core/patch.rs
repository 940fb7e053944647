// crates/backdrop-core/src/core/patch.rs
// ============================================================================
// Module: Backdrop Patches and Changes
// Description: Mutation records emitted by stores to subscribers.
// Purpose: Capture per-path mutations and batch them into change events.
// Dependencies: crate::core::{keypath, scope, value}, serde, uuid
// ============================================================================

//! ## Overview
//! A [`Patch`] records one mutation at one key path, including the
//! pre-mutation snapshot so the inverse can be reconstructed. A [`Change`]
//! batches the patches produced by one logical mutation (a single store call,
//! or a whole committed transaction) and is the unit delivered to the
//! store-level observation stream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::core::keypath::KeyPath;
use crate::core::scope::Scope;
use crate::core::value::StoreValue;

// ============================================================================
// SECTION: Patch Records
// ============================================================================

/// Mutation operation carried by a patch.
///
/// # Invariants
/// - Variants are stable for serialization and remote push payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchOp {
    /// Value written at the key path.
    Set,
    /// Value removed at the key path.
    Remove,
    /// Object keys shallow-merged at the key path.
    Merge,
}

/// Single mutation record at one key path.
///
/// # Invariants
/// - `old_value` is the pre-mutation snapshot at `key_path` (`None` when the
///   path was absent); applying the inverse restores the pre-state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    /// Operation applied at the path.
    pub op: PatchOp,
    /// Path the mutation applies to.
    pub key_path: KeyPath,
    /// Pre-mutation value at the path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<StoreValue>,
    /// Post-mutation value at the path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<StoreValue>,
}

impl Patch {
    /// Creates a `set` patch.
    #[must_use]
    pub const fn set(
        key_path: KeyPath,
        old_value: Option<StoreValue>,
        new_value: StoreValue,
    ) -> Self {
        Self {
            op: PatchOp::Set,
            key_path,
            old_value,
            new_value: Some(new_value),
        }
    }

    /// Creates a `remove` patch.
    #[must_use]
    pub const fn remove(key_path: KeyPath, old_value: Option<StoreValue>) -> Self {
        Self {
            op: PatchOp::Remove,
            key_path,
            old_value,
            new_value: None,
        }
    }

    /// Creates a `merge` patch.
    #[must_use]
    pub const fn merge(
        key_path: KeyPath,
        old_value: Option<StoreValue>,
        new_value: StoreValue,
    ) -> Self {
        Self {
            op: PatchOp::Merge,
            key_path,
            old_value,
            new_value: Some(new_value),
        }
    }
}

// ============================================================================
// SECTION: Change Events
// ============================================================================

/// Batch of patches produced by one logical mutation.
///
/// # Invariants
/// - Patches are ordered by arrival at the owning store's serialization
///   point; a committed transaction's patches share one `transaction_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    /// Patches in buffer order.
    pub patches: Vec<Patch>,
    /// Transaction identifier when the change was committed transactionally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<Uuid>,
    /// Scope of the store that produced the change.
    pub scope: Scope,
}

impl Change {
    /// Creates a non-transactional change.
    #[must_use]
    pub const fn single(patches: Vec<Patch>, scope: Scope) -> Self {
        Self {
            patches,
            transaction_id: None,
            scope,
        }
    }

    /// Creates a transactional change with a fresh identifier.
    #[must_use]
    pub fn transactional(patches: Vec<Patch>, scope: Scope) -> Self {
        Self {
            patches,
            transaction_id: Some(Uuid::new_v4()),
            scope,
        }
    }
}
