// crates/backdrop-store/src/backend/memory.rs
// ============================================================================
// Module: Backdrop Memory Backend
// Description: Volatile in-process storage backend.
// Purpose: Back memory and session stores without persistence.
// Dependencies: backdrop-core
// ============================================================================

//! ## Overview
//! The memory backend keeps state in a mutex-guarded map. It backs both
//! `memory` and `session` storage; the manager clears session instances on
//! scenario teardown. State does not survive the process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;

use backdrop_core::BackendError;
use backdrop_core::BackendState;
use backdrop_core::StorageBackend;

// ============================================================================
// SECTION: Memory Backend
// ============================================================================

/// Volatile in-process backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Current state guarded by a mutex.
    state: Mutex<BackendState>,
}

impl MemoryBackend {
    /// Creates an empty memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self) -> Result<BackendState, BackendError> {
        self.state
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| BackendError::Transport("memory backend mutex poisoned".to_string()))
    }

    fn save(&self, state: &BackendState) -> Result<(), BackendError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| BackendError::Transport("memory backend mutex poisoned".to_string()))?;
        *guard = state.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), BackendError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| BackendError::Transport("memory backend mutex poisoned".to_string()))?;
        guard.clear();
        Ok(())
    }

    fn supports_concurrent_access(&self) -> bool {
        true
    }
}
