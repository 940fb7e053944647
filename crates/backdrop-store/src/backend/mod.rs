// crates/backdrop-store/src/backend/mod.rs
// ============================================================================
// Module: Backdrop Storage Backends
// Description: Physical backings for store instances.
// Purpose: Implement the storage backend contract over memory, preferences,
//          files, and the remote store service.
// Dependencies: backdrop-core, serde_json
// ============================================================================

//! ## Overview
//! Each `(scope, storage)` pair owns one backend instance. Backends exchange
//! flat maps of top-level entries in bare JSON form; the owning store is the
//! only writer of a backend's persisted state. Memory and session backends
//! are volatile; the file backend replaces atomically; the prefs backend
//! serializes one blob per store key; the remote backend translates saves
//! into pushed changes.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod file;
pub mod memory;
pub mod prefs;
pub mod remote;

// ============================================================================
// SECTION: Imports
// ============================================================================

use backdrop_core::BackendState;
use backdrop_core::KeyPath;
use backdrop_core::StoreValue;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use prefs::UserPrefsBackend;
pub use remote::RemoteBackend;

// ============================================================================
// SECTION: State Encoding
// ============================================================================

/// Encodes backend state as a bare JSON object keyed by path text.
#[must_use]
pub fn encode_state(state: &BackendState) -> Value {
    let mut map = Map::new();
    for (path, value) in state {
        map.insert(path.as_str().to_string(), value.to_bare());
    }
    Value::Object(map)
}

/// Decodes a bare JSON object into backend state.
///
/// Non-object roots decode as empty state; the caller decides whether that
/// is a warning.
#[must_use]
pub fn decode_state(value: &Value) -> BackendState {
    let Value::Object(map) = value else {
        return BackendState::new();
    };
    map.iter()
        .map(|(key, item)| (KeyPath::new(key.clone()), StoreValue::from_bare(item)))
        .collect()
}
