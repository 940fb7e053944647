// crates/backdrop-store/src/manager.rs
// ============================================================================
// Module: Backdrop Store Manager
// Description: Store factory, cache, and lifecycle coordinator.
// Purpose: Key stores by (scope, storage), reset scopes, handle versions.
// Dependencies: backdrop-core, crate::{backend, store}
// ============================================================================

//! ## Overview
//! The manager is the only process-wide collaborator: it materializes store
//! instances lazily, caches them by `(scope, storage)`, and owns scope
//! lifecycle: scenario setup and teardown, scope resets that also clear
//! persistent state, and the scenario-store purge on a major version bump.
//! Everything else (remote client, preferences location, application id) is
//! injected configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use backdrop_core::RemoteStoreClient;
use backdrop_core::ScenarioDocument;
use backdrop_core::ScenarioId;
use backdrop_core::Scope;
use backdrop_core::SemanticVersion;
use backdrop_core::Storage;
use backdrop_core::StorageBackend;
use backdrop_core::StoreKey;
use backdrop_core::interfaces::BackendError;
use tracing::debug;

use crate::backend::FileBackend;
use crate::backend::MemoryBackend;
use crate::backend::RemoteBackend;
use crate::backend::UserPrefsBackend;
use crate::store::KeyValueStore;
use crate::store::StoreError;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Manager configuration.
pub struct StoreManagerConfig {
    /// Application identifier used in preference blob keys.
    pub app_id: String,
    /// Directory holding preference suite files.
    pub prefs_dir: PathBuf,
    /// Remote client for `backend` storage; absent means remote stores fail.
    pub remote: Option<Arc<dyn RemoteStoreClient>>,
}

impl StoreManagerConfig {
    /// Creates a configuration without a remote client.
    #[must_use]
    pub fn new(app_id: impl Into<String>, prefs_dir: PathBuf) -> Self {
        Self {
            app_id: app_id.into(),
            prefs_dir,
            remote: None,
        }
    }

    /// Attaches the remote store client.
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn RemoteStoreClient>) -> Self {
        self.remote = Some(remote);
        self
    }
}

// ============================================================================
// SECTION: Manager
// ============================================================================

/// Store factory and cache.
///
/// # Invariants
/// - `get_store` returns the same instance for a `(scope, storage)` key
///   until the scope is reset or cleaned up.
pub struct StoreManager {
    /// Injected configuration.
    config: StoreManagerConfig,
    /// Cached store instances.
    stores: Mutex<BTreeMap<StoreKey, Arc<KeyValueStore>>>,
}

impl StoreManager {
    /// Creates a manager.
    #[must_use]
    pub fn new(config: StoreManagerConfig) -> Self {
        Self {
            config,
            stores: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the cached store for the key, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] when the backend cannot be built or
    /// its initial load fails.
    pub fn get_store(
        &self,
        scope: Scope,
        storage: Storage,
    ) -> Result<Arc<KeyValueStore>, StoreError> {
        let key = StoreKey::new(scope, storage);
        let mut stores = self.stores.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(store) = stores.get(&key) {
            return Ok(Arc::clone(store));
        }
        let backend = self.build_backend(&key)?;
        let store = Arc::new(KeyValueStore::new(key.scope.clone(), backend)?);
        stores.insert(key, Arc::clone(&store));
        Ok(store)
    }

    /// Drops cached instances and clears persistent state for a scope.
    ///
    /// # Errors
    ///
    /// Returns the first backend clear failure after dropping all caches.
    pub fn reset_stores(&self, scope: &Scope) -> Result<(), StoreError> {
        let removed = self.take_matching(|key| &key.scope == scope)?;
        debug!(scope = %scope, count = removed.len(), "resetting stores");
        let mut first_failure = None;
        for store in removed {
            if let Err(err) = store.clear_all()
                && first_failure.is_none()
            {
                first_failure = Some(err);
            }
        }
        first_failure.map_or(Ok(()), Err)
    }

    /// Pre-creates the default memory and session stores for a scenario.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when either store cannot be created.
    pub fn configure_scenario_stores(&self, id: &ScenarioId) -> Result<(), StoreError> {
        self.get_store(Scope::scenario(id.clone()), Storage::Memory)?;
        self.get_store(Scope::scenario(id.clone()), Storage::Session)?;
        Ok(())
    }

    /// Materializes stores declared by a scenario document and seeds their
    /// initial values.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a store cannot be created or an initial
    /// value fails a configured rule in strict mode.
    pub fn configure_from_document(
        &self,
        id: &ScenarioId,
        document: &ScenarioDocument,
    ) -> Result<(), StoreError> {
        self.configure_scenario_stores(id)?;
        for descriptor in &document.stores {
            let key = backdrop_core::StoreRef {
                scope: descriptor.scope,
                storage: descriptor.storage.clone(),
            }
            .resolve(id);
            let store = self.get_store(key.scope, key.storage)?;
            for (path, value) in &descriptor.initial_value {
                store.set(path.clone(), value.clone())?;
            }
        }
        Ok(())
    }

    /// Drops the scenario's stores, clearing session state.
    ///
    /// # Errors
    ///
    /// Returns the first session clear failure after dropping the caches.
    pub fn cleanup_scenario_stores(&self, id: &ScenarioId) -> Result<(), StoreError> {
        let removed = self.take_matching(|key| key.scope.scenario_id() == Some(id))?;
        debug!(scenario = %id, count = removed.len(), "cleaning up scenario stores");
        let mut first_failure = None;
        for store in removed {
            if let Err(err) = store.clear_all()
                && first_failure.is_none()
            {
                first_failure = Some(err);
            }
        }
        first_failure.map_or(Ok(()), Err)
    }

    /// Handles a version change: a major bump drops every scenario-scoped
    /// store.
    ///
    /// # Errors
    ///
    /// Returns the first clear failure after dropping the caches.
    pub fn handle_version_change(
        &self,
        old: &SemanticVersion,
        new: &SemanticVersion,
    ) -> Result<(), StoreError> {
        if old.major == new.major {
            return Ok(());
        }
        debug!(old = %old, new = %new, "major version change; dropping scenario stores");
        let removed = self.take_matching(|key| key.scope.scenario_id().is_some())?;
        let mut first_failure = None;
        for store in removed {
            if let Err(err) = store.clear_all()
                && first_failure.is_none()
            {
                first_failure = Some(err);
            }
        }
        first_failure.map_or(Ok(()), Err)
    }

    /// Removes and returns cached stores matching the predicate.
    fn take_matching(
        &self,
        predicate: impl Fn(&StoreKey) -> bool,
    ) -> Result<Vec<Arc<KeyValueStore>>, StoreError> {
        let mut stores = self.stores.lock().map_err(|_| StoreError::Poisoned)?;
        let keys: Vec<StoreKey> =
            stores.keys().filter(|key| predicate(key)).cloned().collect();
        Ok(keys.into_iter().filter_map(|key| stores.remove(&key)).collect())
    }

    /// Builds the backend for a store key.
    fn build_backend(&self, key: &StoreKey) -> Result<Arc<dyn StorageBackend>, StoreError> {
        match &key.storage {
            Storage::Memory | Storage::Session => Ok(Arc::new(MemoryBackend::new())),
            Storage::UserPrefs {
                suite,
            } => {
                let file = format!("{}.json", suite.as_deref().unwrap_or("preferences"));
                let blob_key = format!("{}.{}", self.config.app_id, key.scope.storage_key());
                Ok(Arc::new(UserPrefsBackend::new(self.config.prefs_dir.join(file), blob_key)))
            }
            Storage::File {
                url,
            } => Ok(Arc::new(FileBackend::new(url)?)),
            Storage::Backend {
                namespace,
            } => {
                let client = self.config.remote.clone().ok_or_else(|| {
                    StoreError::Backend(BackendError::Transport(
                        "no remote store client configured".to_string(),
                    ))
                })?;
                Ok(Arc::new(RemoteBackend::new(client, namespace.clone(), key.scope.clone())))
            }
        }
    }
}
