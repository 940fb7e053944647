// crates/backdrop-store/src/store.rs
// ============================================================================
// Module: Backdrop Key-Value Store
// Description: Reactive, validated, persisted key-value store.
// Purpose: Serialize mutations, emit changes, and maintain live expressions.
// Dependencies: backdrop-core, backdrop-validation, crate::{backend, live, observe}
// ============================================================================

//! ## Overview
//! A store owns one value tree for one `(scope, storage)` pair. Every
//! operation funnels through one internal mutex, the store's serialization
//! point, so patches are totally ordered. A committed mutation runs the
//! live-expression cascade, persists the snapshot through the backend, and
//! notifies the store-level change stream plus per-path and per-set
//! observers, in that order. Transactions buffer patches and commit them as
//! one change with a fresh transaction id; a failing transaction restores
//! the pre-transaction root and emits nothing.
//!
//! Observers receive values on the serialization point's delivery path and
//! must not call back into the store synchronously.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use backdrop_core::BackendError;
use backdrop_core::BackendState;
use backdrop_core::Change;
use backdrop_core::KeyPath;
use backdrop_core::KeyPathError;
use backdrop_core::Patch;
use backdrop_core::Scope;
use backdrop_core::StorageBackend;
use backdrop_core::StoreValue;
use backdrop_core::ValueKind;
use backdrop_core::dependency_overlaps;
use backdrop_core::keypath;
use backdrop_validation::StoreRuleAdapter;
use backdrop_validation::ValidationOptions;
use backdrop_validation::ValidationResult;
use backdrop_validation::WriteDecision;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use tracing::warn;
use uuid::Uuid;

use crate::live::ExpressionRegistry;
use crate::live::LiveExpression;
use crate::live::LiveReader;
use crate::live::WritePolicy;
use crate::observe::ChangeObserver;
use crate::observe::ChangeSubscription;
use crate::observe::PathSubscription;
use crate::observe::SetObserver;
use crate::observe::SetSubscription;
use crate::observe::ValueObserver;
use crate::observe::change_channel;
use crate::observe::path_channel;
use crate::observe::set_channel;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Typed read on an absent path.
    #[error("no value at {0}")]
    NotFound(KeyPath),
    /// Value at a path failed to decode as the requested type.
    #[error("decode failure at {path}: {reason}")]
    Decode {
        /// Path of the value.
        path: KeyPath,
        /// Decoder message.
        reason: String,
    },
    /// Operation received a value of the wrong kind.
    #[error("expected {expected} at {path}, got {got}")]
    InvalidValueType {
        /// Expected value kind.
        expected: ValueKind,
        /// Actual value kind.
        got: ValueKind,
        /// Path of the operation.
        path: KeyPath,
    },
    /// Strict-mode validation rejected a write.
    #[error("write validation failed: {}", .0.client_summary())]
    Validation(ValidationResult),
    /// Key path failed to parse.
    #[error(transparent)]
    KeyPath(#[from] KeyPathError),
    /// Backend I/O failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// Live-expression registration would create a cycle.
    #[error("live expression would create a cycle: {0}")]
    CycleDetected(String),
    /// The store mutex was poisoned by a panicking holder.
    #[error("store serialization point poisoned")]
    Poisoned,
}

// ============================================================================
// SECTION: Store State
// ============================================================================

/// State behind the store's serialization point.
struct StoreInner {
    /// Root value tree; always an object.
    root: StoreValue,
    /// Per-path validation configuration.
    validation: ValidationOptions,
    /// Registered live expressions.
    expressions: ExpressionRegistry,
    /// Per-path subscriptions.
    path_subs: Vec<PathSubscription>,
    /// Path-set subscriptions.
    set_subs: Vec<SetSubscription>,
    /// Store-level change subscriptions.
    change_subs: Vec<ChangeSubscription>,
}

/// Reactive key-value store for one `(scope, storage)` pair.
pub struct KeyValueStore {
    /// Logical scope of the store.
    scope: Scope,
    /// Storage backend persisting the snapshot.
    backend: Arc<dyn StorageBackend>,
    /// Rule adapter gating writes.
    adapter: StoreRuleAdapter,
    /// Serialization point guarding all state.
    inner: Mutex<StoreInner>,
}

impl KeyValueStore {
    /// Creates a store initialized from the backend's current state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] when the backend load fails (remote
    /// backends; file and prefs backends degrade to empty with a warning)
    /// and [`StoreError::KeyPath`] when a persisted key does not parse.
    pub fn new(
        scope: Scope,
        backend: Arc<dyn StorageBackend>,
    ) -> Result<Self, StoreError> {
        let state = backend.load()?;
        let mut root = StoreValue::empty_object();
        for (path, value) in state {
            keypath::set(&mut root, &path, value)?;
        }
        Ok(Self {
            scope,
            backend,
            adapter: StoreRuleAdapter::default(),
            inner: Mutex::new(StoreInner {
                root,
                validation: ValidationOptions::default(),
                expressions: ExpressionRegistry::new(),
                path_subs: Vec::new(),
                set_subs: Vec::new(),
                change_subs: Vec::new(),
            }),
        })
    }

    /// Returns the store's scope.
    #[must_use]
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Locks the serialization point.
    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Reads the value at a path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the serialization point is
    /// unusable.
    pub fn get(&self, path: impl Into<KeyPath>) -> Result<Option<StoreValue>, StoreError> {
        let path = path.into();
        let guard = self.lock()?;
        Ok(keypath::get(&guard.root, &path).cloned())
    }

    /// True when a value exists at the path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the serialization point is
    /// unusable.
    pub fn exists(&self, path: impl Into<KeyPath>) -> Result<bool, StoreError> {
        Ok(self.get(path)?.is_some())
    }

    /// Reads and decodes the value at a path into a host type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the path is absent and
    /// [`StoreError::Decode`] when the bare form does not decode as `T`.
    pub fn get_typed<T: DeserializeOwned>(
        &self,
        path: impl Into<KeyPath>,
    ) -> Result<T, StoreError> {
        let path = path.into();
        let value = self.get(path.clone())?.ok_or_else(|| StoreError::NotFound(path.clone()))?;
        serde_json::from_value(value.to_bare()).map_err(|err| StoreError::Decode {
            path,
            reason: err.to_string(),
        })
    }

    /// Returns the top-level entries of the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the serialization point is
    /// unusable.
    pub fn snapshot(&self) -> Result<BackendState, StoreError> {
        let guard = self.lock()?;
        Ok(snapshot_entries(&guard.root))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Writes a value at a path.
    ///
    /// The write is validated against the configured rules. Strict-mode
    /// failures reject the write and surface [`StoreError::Validation`];
    /// lenient-mode failures coerce to the rule's kind, fall back to the
    /// rule default, or drop the write with a warning. A successful write
    /// emits one `set` patch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] in strict mode and
    /// [`StoreError::KeyPath`] when the path does not parse.
    pub fn set(&self, path: impl Into<KeyPath>, value: StoreValue) -> Result<(), StoreError> {
        let path = path.into();
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let value = match self.adapter.decide_write(&inner.validation, &path, value) {
            WriteDecision::Allow(value) => value,
            WriteDecision::Reject(result) => {
                warn!(path = %path, "strict validation rejected write");
                return Err(StoreError::Validation(result));
            }
            WriteDecision::Drop(_) => {
                warn!(path = %path, "lenient validation dropped write");
                return Ok(());
            }
        };
        let old = keypath::set(&mut inner.root, &path, value.clone())?;
        let patch = Patch::set(path, old, value);
        self.commit(inner, vec![patch], None);
        Ok(())
    }

    /// Shallow-merges an object at a path.
    ///
    /// Keys of `value` overwrite keys of the current object. When the
    /// current value is absent or not an object the incoming object replaces
    /// it and a `set` patch is emitted instead of `merge`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidValueType`] when `value` is not an
    /// object and [`StoreError::Validation`] on strict-mode rejection.
    pub fn merge(&self, path: impl Into<KeyPath>, value: StoreValue) -> Result<(), StoreError> {
        let path = path.into();
        let StoreValue::Object(incoming) = value else {
            return Err(StoreError::InvalidValueType {
                expected: ValueKind::Object,
                got: value.kind(),
                path,
            });
        };
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let current = keypath::get(&inner.root, &path).cloned();
        let (was_object, merged) = match current {
            Some(StoreValue::Object(mut existing)) => {
                for (key, item) in incoming {
                    existing.insert(key, item);
                }
                (true, StoreValue::Object(existing))
            }
            _ => (false, StoreValue::Object(incoming)),
        };
        let merged = match self.adapter.decide_write(&inner.validation, &path, merged) {
            WriteDecision::Allow(value) => value,
            WriteDecision::Reject(result) => {
                warn!(path = %path, "strict validation rejected merge");
                return Err(StoreError::Validation(result));
            }
            WriteDecision::Drop(_) => {
                warn!(path = %path, "lenient validation dropped merge");
                return Ok(());
            }
        };
        let old = keypath::set(&mut inner.root, &path, merged.clone())?;
        let patch = if was_object {
            Patch::merge(path, old, merged)
        } else {
            Patch::set(path, old, merged)
        };
        self.commit(inner, vec![patch], None);
        Ok(())
    }

    /// Removes the value at a path.
    ///
    /// Removing an absent path is a no-op for the tree but still emits a
    /// `remove` patch with both values absent; per-path observers are only
    /// notified when the value actually changed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the serialization point is
    /// unusable.
    pub fn remove(&self, path: impl Into<KeyPath>) -> Result<(), StoreError> {
        let path = path.into();
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let old = keypath::remove(&mut inner.root, &path);
        let patch = Patch::remove(path, old);
        self.commit(inner, vec![patch], None);
        Ok(())
    }

    /// Replaces the whole root object.
    ///
    /// Emits one coarse `merge` patch at the root; the store-level stream
    /// always receives it and per-path observers are notified for their own
    /// paths.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidValueType`] when `root` is not an
    /// object.
    pub fn replace_all(&self, root: StoreValue) -> Result<(), StoreError> {
        if !root.is_of_kind(ValueKind::Object) {
            return Err(StoreError::InvalidValueType {
                expected: ValueKind::Object,
                got: root.kind(),
                path: KeyPath::root(),
            });
        }
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let old = std::mem::replace(&mut inner.root, root.clone());
        let patch = Patch::merge(KeyPath::root(), Some(old), root);
        self.commit(inner, vec![patch], None);
        Ok(())
    }

    /// Runs a transaction against this store.
    ///
    /// Patches produced inside the block are buffered and committed as one
    /// [`Change`] with a fresh transaction id. An error from the block rolls
    /// the root back and emits nothing. Per-path observers still see only
    /// the committed values; intermediate states never leave the
    /// serialization point.
    ///
    /// # Errors
    ///
    /// Propagates the block's error after rolling back.
    pub fn transaction<F>(&self, block: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut StoreTransaction<'_>) -> Result<(), StoreError>,
    {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let saved = inner.root.clone();
        let mut txn = StoreTransaction {
            adapter: &self.adapter,
            validation: &inner.validation,
            root: &mut inner.root,
            patches: Vec::new(),
        };
        match block(&mut txn) {
            Ok(()) => {
                let StoreTransaction {
                    patches, ..
                } = txn;
                self.commit(inner, patches, Some(Uuid::new_v4()));
                Ok(())
            }
            Err(err) => {
                inner.root = saved;
                debug!(scope = %self.scope, "transaction rolled back");
                Err(err)
            }
        }
    }

    /// Clears the in-memory tree and the persisted backend state.
    ///
    /// Used by the manager on scope resets; no change event is emitted
    /// because the instance is being dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] when clearing the backend fails.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        guard.root = StoreValue::empty_object();
        self.backend.clear()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Installs the per-path validation configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the serialization point is
    /// unusable.
    pub fn configure_validation(&self, options: ValidationOptions) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        guard.validation = options;
        Ok(())
    }

    /// Validates a prospective write without applying it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the serialization point is
    /// unusable.
    pub fn validate_write(
        &self,
        path: impl Into<KeyPath>,
        value: &StoreValue,
    ) -> Result<ValidationResult, StoreError> {
        let path = path.into();
        let guard = self.lock()?;
        Ok(guard.validation.schema.get(&path).map_or_else(ValidationResult::valid, |rule| {
            self.adapter.validate_value(rule, value, &path)
        }))
    }

    /// Validates a whole change against the configured rules.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the serialization point is
    /// unusable.
    pub fn validate_change(&self, change: &Change) -> Result<ValidationResult, StoreError> {
        let guard = self.lock()?;
        Ok(self.adapter.validate_change(&guard.validation, change))
    }

    // ------------------------------------------------------------------
    // Live expressions
    // ------------------------------------------------------------------

    /// Registers a live expression and evaluates it once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CycleDetected`] when the expression's
    /// dependency graph would include its own output.
    pub fn register_live_expression(
        &self,
        expression: LiveExpression,
    ) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        inner
            .expressions
            .register(expression.clone())
            .map_err(StoreError::CycleDetected)?;
        let patch = evaluate_expression(&mut inner.root, &expression);
        if let Some(patch) = patch {
            self.commit(inner, vec![patch], None);
        }
        Ok(())
    }

    /// Unregisters a live expression by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the serialization point is
    /// unusable.
    pub fn unregister_live_expression(&self, id: &str) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        guard.expressions.unregister(id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Observes one path: current value first, then one item per change.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the serialization point is
    /// unusable.
    pub fn observe(&self, path: impl Into<KeyPath>) -> Result<ValueObserver, StoreError> {
        let path = path.into();
        let mut guard = self.lock()?;
        let (subscription, observer) = path_channel(path);
        let current = keypath::get(&guard.root, &subscription.path).cloned();
        let _ = subscription.sender.send(current);
        guard.path_subs.push(subscription);
        Ok(observer)
    }

    /// Observes a set of paths, wildcards allowed.
    ///
    /// Yields an object keyed by path text whenever any in-set path changes;
    /// the initial object is delivered eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the serialization point is
    /// unusable.
    pub fn observe_many(
        &self,
        paths: Vec<KeyPath>,
    ) -> Result<SetObserver, StoreError> {
        let mut guard = self.lock()?;
        let (subscription, observer) = set_channel(paths);
        let initial = collect_set(&guard.root, &subscription.paths);
        let _ = subscription.sender.send(initial);
        guard.set_subs.push(subscription);
        Ok(observer)
    }

    /// Observes the store-level change stream.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the serialization point is
    /// unusable.
    pub fn observe_changes(&self) -> Result<ChangeObserver, StoreError> {
        let mut guard = self.lock()?;
        let (subscription, observer) = change_channel();
        guard.change_subs.push(subscription);
        Ok(observer)
    }

    // ------------------------------------------------------------------
    // Commit pipeline
    // ------------------------------------------------------------------

    /// Commits patches: live-expression cascade, persistence, notification.
    ///
    /// Expression writes triggered by the patches join the same change, so
    /// downstream expressions fire within one logical cycle; each expression
    /// evaluates at most once per commit, which the acyclic registry makes a
    /// fixed point.
    fn commit(&self, inner: &mut StoreInner, mut patches: Vec<Patch>, transaction_id: Option<Uuid>) {
        if patches.is_empty() {
            return;
        }
        let mut cursor = 0;
        let mut evaluated: Vec<String> = Vec::new();
        while cursor < patches.len() {
            let batch: Vec<KeyPath> =
                patches[cursor..].iter().map(|patch| patch.key_path.clone()).collect();
            cursor = patches.len();
            for expression in inner.expressions.triggered_by(&batch) {
                if evaluated.contains(&expression.id) {
                    continue;
                }
                evaluated.push(expression.id.clone());
                if let Some(patch) = evaluate_expression(&mut inner.root, &expression) {
                    patches.push(patch);
                }
            }
        }

        if let Err(err) = self.backend.save(&snapshot_entries(&inner.root)) {
            // Persistence is best-effort at commit time; local state stays
            // authoritative and the failure is logged, not raised.
            warn!(scope = %self.scope, error = %err, "backend save failed");
        }

        let change = Change {
            patches,
            transaction_id,
            scope: self.scope.clone(),
        };

        inner.change_subs.retain(|sub| sub.sender.send(change.clone()).is_ok());

        let effective: Vec<KeyPath> = change
            .patches
            .iter()
            .filter(|patch| patch.old_value != patch.new_value)
            .map(|patch| patch.key_path.clone())
            .collect();
        if effective.is_empty() {
            return;
        }
        let StoreInner {
            root,
            path_subs,
            set_subs,
            ..
        } = inner;
        let root: &StoreValue = root;
        path_subs.retain(|sub| {
            if !effective.iter().any(|path| dependency_overlaps(&sub.path, path)) {
                return true;
            }
            let value = keypath::get(root, &sub.path).cloned();
            sub.sender.send(value).is_ok()
        });
        set_subs.retain(|sub| {
            let touched = sub
                .paths
                .iter()
                .any(|watched| effective.iter().any(|path| dependency_overlaps(watched, path)));
            if !touched {
                return true;
            }
            sub.sender.send(collect_set(root, &sub.paths)).is_ok()
        });
    }
}

// ============================================================================
// SECTION: Transactions
// ============================================================================

/// Mutation view handed to a transaction block.
///
/// Writes apply to the live root immediately, so later reads inside the
/// block observe them, while patches are buffered for the single commit.
pub struct StoreTransaction<'txn> {
    /// Rule adapter gating writes.
    adapter: &'txn StoreRuleAdapter,
    /// Validation configuration of the owning store.
    validation: &'txn ValidationOptions,
    /// Borrowed root tree.
    root: &'txn mut StoreValue,
    /// Patches buffered for commit.
    patches: Vec<Patch>,
}

impl StoreTransaction<'_> {
    /// Reads the value at a path, observing earlier writes in the block.
    #[must_use]
    pub fn get(&self, path: &KeyPath) -> Option<StoreValue> {
        keypath::get(self.root, path).cloned()
    }

    /// Writes a value at a path inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] on strict-mode rejection; the
    /// caller's error propagation rolls back the whole transaction.
    pub fn set(&mut self, path: impl Into<KeyPath>, value: StoreValue) -> Result<(), StoreError> {
        let path = path.into();
        let value = match self.adapter.decide_write(self.validation, &path, value) {
            WriteDecision::Allow(value) => value,
            WriteDecision::Reject(result) => return Err(StoreError::Validation(result)),
            WriteDecision::Drop(_) => {
                warn!(path = %path, "lenient validation dropped transactional write");
                return Ok(());
            }
        };
        let old = keypath::set(self.root, &path, value.clone())?;
        self.patches.push(Patch::set(path, old, value));
        Ok(())
    }

    /// Shallow-merges an object at a path inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidValueType`] when `value` is not an
    /// object and [`StoreError::Validation`] on strict-mode rejection.
    pub fn merge(&mut self, path: impl Into<KeyPath>, value: StoreValue) -> Result<(), StoreError> {
        let path = path.into();
        let StoreValue::Object(incoming) = value else {
            return Err(StoreError::InvalidValueType {
                expected: ValueKind::Object,
                got: value.kind(),
                path,
            });
        };
        let current = keypath::get(self.root, &path).cloned();
        let (was_object, merged) = match current {
            Some(StoreValue::Object(mut existing)) => {
                for (key, item) in incoming {
                    existing.insert(key, item);
                }
                (true, StoreValue::Object(existing))
            }
            _ => (false, StoreValue::Object(incoming)),
        };
        let merged = match self.adapter.decide_write(self.validation, &path, merged) {
            WriteDecision::Allow(value) => value,
            WriteDecision::Reject(result) => return Err(StoreError::Validation(result)),
            WriteDecision::Drop(_) => {
                warn!(path = %path, "lenient validation dropped transactional merge");
                return Ok(());
            }
        };
        let old = keypath::set(self.root, &path, merged.clone())?;
        self.patches.push(if was_object {
            Patch::merge(path, old, merged)
        } else {
            Patch::set(path, old, merged)
        });
        Ok(())
    }

    /// Removes the value at a path inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KeyPath`] when the path does not parse.
    pub fn remove(&mut self, path: impl Into<KeyPath>) -> Result<(), StoreError> {
        let path = path.into();
        let old = keypath::remove(self.root, &path);
        self.patches.push(Patch::remove(path, old));
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Flattens the root object into top-level backend entries.
fn snapshot_entries(root: &StoreValue) -> BackendState {
    match root {
        StoreValue::Object(map) => map
            .iter()
            .map(|(key, value)| (KeyPath::new(key.clone()), value.clone()))
            .collect(),
        _ => BackendState::new(),
    }
}

/// Builds the object payload for a path-set observer.
fn collect_set(root: &StoreValue, paths: &[KeyPath]) -> StoreValue {
    let mut out = std::collections::BTreeMap::new();
    for path in paths {
        let value = if path.has_wildcard() {
            // Wildcards cannot be read directly; expose the prefix container.
            let prefix = path.as_str().split("[*]").next().unwrap_or_default();
            keypath::get(root, &KeyPath::new(prefix)).cloned()
        } else {
            keypath::get(root, path).cloned()
        };
        out.insert(path.as_str().to_string(), value.unwrap_or(StoreValue::Null));
    }
    StoreValue::Object(out)
}

/// Evaluates one expression and writes its output per policy.
fn evaluate_expression(root: &mut StoreValue, expression: &LiveExpression) -> Option<Patch> {
    let computed = {
        let reader = LiveReader::new(root);
        (expression.compute)(&reader)
    };
    let value = computed?;
    let current = keypath::get(root, &expression.output_key_path).cloned();
    if expression.policy == WritePolicy::WriteIfChanged && current.as_ref() == Some(&value) {
        return None;
    }
    let old = keypath::set(root, &expression.output_key_path, value.clone()).ok()?;
    Some(Patch::set(expression.output_key_path.clone(), old, value))
}
