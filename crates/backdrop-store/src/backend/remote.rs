// crates/backdrop-store/src/backend/remote.rs
// ============================================================================
// Module: Backdrop Remote Backend
// Description: Storage backend over the remote store service.
// Purpose: Pull initial state and push change batches to a namespace.
// Dependencies: backdrop-core
// ============================================================================

//! ## Overview
//! The remote backend adapts the namespace-addressed remote store client to
//! the local backend contract. Loads pull the namespace snapshot; saves
//! translate the local snapshot into one pushed change (a set patch per
//! top-level entry). Pushes are best-effort by contract: the owning store
//! logs failures without rolling back local state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use backdrop_core::BackendError;
use backdrop_core::BackendState;
use backdrop_core::Change;
use backdrop_core::KeyPath;
use backdrop_core::Patch;
use backdrop_core::RemoteStoreClient;
use backdrop_core::ScenarioId;
use backdrop_core::Scope;
use backdrop_core::StorageBackend;

// ============================================================================
// SECTION: Remote Backend
// ============================================================================

/// Backend pushing and pulling through the remote store client.
pub struct RemoteBackend {
    /// Injected remote client.
    client: Arc<dyn RemoteStoreClient>,
    /// Remote namespace for this store.
    namespace: String,
    /// Scope used to tag pushed changes and scope the namespace.
    scope: Scope,
}

impl RemoteBackend {
    /// Creates a backend for a namespace under a scope.
    #[must_use]
    pub const fn new(client: Arc<dyn RemoteStoreClient>, namespace: String, scope: Scope) -> Self {
        Self {
            client,
            namespace,
            scope,
        }
    }

    /// Scenario identifier sent alongside scenario-scoped calls.
    fn scenario_id(&self) -> Option<&ScenarioId> {
        self.scope.scenario_id()
    }
}

impl StorageBackend for RemoteBackend {
    fn load(&self) -> Result<BackendState, BackendError> {
        self.client.pull(&self.namespace, self.scenario_id())
    }

    fn save(&self, state: &BackendState) -> Result<(), BackendError> {
        let patches = state
            .iter()
            .map(|(path, value)| Patch::set(path.clone(), None, value.clone()))
            .collect();
        let change = Change::single(patches, self.scope.clone());
        self.client.push(&self.namespace, self.scenario_id(), &[change])
    }

    fn clear(&self) -> Result<(), BackendError> {
        let change = Change::single(vec![Patch::remove(KeyPath::root(), None)], self.scope.clone());
        self.client.push(&self.namespace, self.scenario_id(), &[change])
    }

    fn supports_concurrent_access(&self) -> bool {
        true
    }
}
