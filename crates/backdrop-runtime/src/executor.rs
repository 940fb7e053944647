// crates/backdrop-runtime/src/executor.rs
// ============================================================================
// Module: Backdrop Action Executor
// Description: Single execution path for declarative actions.
// Purpose: Resolve descriptors, apply store mutations, and emit intents.
// Dependencies: backdrop-core, backdrop-store, crate::resolver
// ============================================================================

//! ## Overview
//! The executor is the canonical walk over an action tree: store actions
//! mutate the target store, navigation/UI/system actions resolve their
//! parameters and leave as intents, `api.request` round-trips through the
//! injected HTTP client, and `sequence`/`conditional` provide control flow.
//! An invocation moves through resolve-values then apply; failures either
//! propagate (`stop_on_error`, transactions) or are logged and swallowed
//! (lenient sequences). Collaborators are wired through a builder, mirroring
//! the store manager's injected-configuration posture.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use backdrop_core::Action;
use backdrop_core::ActionBody;
use backdrop_core::ActionButton;
use backdrop_core::ActionId;
use backdrop_core::BackendError;
use backdrop_core::HeaderEntry;
use backdrop_core::HttpClient;
use backdrop_core::HttpMethod;
use backdrop_core::HttpRequest;
use backdrop_core::KeyPath;
use backdrop_core::NavigationIntent;
use backdrop_core::NavigationParam;
use backdrop_core::NavigationSink;
use backdrop_core::ResolvedButton;
use backdrop_core::ResponseMapping;
use backdrop_core::ScenarioDocument;
use backdrop_core::SequenceStrategy;
use backdrop_core::SinkError;
use backdrop_core::StoreRef;
use backdrop_core::StoreValue;
use backdrop_core::SystemIntent;
use backdrop_core::SystemSink;
use backdrop_core::UiIntent;
use backdrop_core::UiSink;
use backdrop_core::ValueDescriptor;
use backdrop_store::StoreError;
use backdrop_store::StoreManager;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::resolver::EventContext;
use crate::resolver::ResolveError;
use crate::resolver::ValueResolver;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Action execution errors.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Builder was missing a required collaborator.
    #[error("executor is missing a collaborator: {0}")]
    MissingCollaborator(&'static str),
    /// No registered action carries the identifier.
    #[error("unknown action id: {0}")]
    UnknownAction(ActionId),
    /// Action is ill-formed for execution.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// Descriptor resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Store mutation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// HTTP failure with no `onError` handler to absorb it.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// Intent sink failed to deliver.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder wiring the executor's collaborators.
#[derive(Default)]
pub struct ActionExecutorBuilder {
    /// Store manager.
    stores: Option<Arc<StoreManager>>,
    /// Navigation sink.
    navigation: Option<Arc<dyn NavigationSink>>,
    /// UI sink.
    ui: Option<Arc<dyn UiSink>>,
    /// System sink.
    system: Option<Arc<dyn SystemSink>>,
    /// HTTP client for `api.request`.
    http: Option<Arc<dyn HttpClient>>,
    /// Actions registered for id lookup.
    actions: Vec<Action>,
}

impl ActionExecutorBuilder {
    /// Sets the store manager.
    #[must_use]
    pub fn stores(mut self, stores: Arc<StoreManager>) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Sets the navigation sink.
    #[must_use]
    pub fn navigation(mut self, sink: impl NavigationSink + 'static) -> Self {
        self.navigation = Some(Arc::new(sink));
        self
    }

    /// Sets the UI sink.
    #[must_use]
    pub fn ui(mut self, sink: impl UiSink + 'static) -> Self {
        self.ui = Some(Arc::new(sink));
        self
    }

    /// Sets the system sink.
    #[must_use]
    pub fn system(mut self, sink: impl SystemSink + 'static) -> Self {
        self.system = Some(Arc::new(sink));
        self
    }

    /// Sets the HTTP client.
    #[must_use]
    pub fn http(mut self, client: impl HttpClient + 'static) -> Self {
        self.http = Some(Arc::new(client));
        self
    }

    /// Registers the root actions of a scenario document.
    #[must_use]
    pub fn document(mut self, document: &ScenarioDocument) -> Self {
        self.actions.extend(document.actions.iter().cloned());
        self
    }

    /// Registers additional actions for id lookup.
    #[must_use]
    pub fn actions(mut self, actions: Vec<Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Builds the executor.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::MissingCollaborator`] when any required
    /// collaborator is absent.
    pub fn build(self) -> Result<ActionExecutor, ExecutorError> {
        let stores = self.stores.ok_or(ExecutorError::MissingCollaborator("stores"))?;
        let mut registry = BTreeMap::new();
        for action in self.actions {
            if let Some(id) = &action.id {
                registry.insert(id.clone(), action);
            }
        }
        Ok(ActionExecutor {
            resolver: ValueResolver::new(Arc::clone(&stores)),
            stores,
            navigation: self.navigation.ok_or(ExecutorError::MissingCollaborator("navigation"))?,
            ui: self.ui.ok_or(ExecutorError::MissingCollaborator("ui"))?,
            system: self.system.ok_or(ExecutorError::MissingCollaborator("system"))?,
            http: self.http.ok_or(ExecutorError::MissingCollaborator("http"))?,
            actions: registry,
        })
    }
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Pre-resolved store operation applied inside a transaction.
enum TransactionOp {
    /// Write a resolved value.
    Set(KeyPath, StoreValue),
    /// Merge a resolved object.
    Merge(KeyPath, StoreValue),
    /// Remove a path.
    Remove(KeyPath),
}

/// Declarative action executor.
pub struct ActionExecutor {
    /// Store manager for store actions and descriptor reads.
    stores: Arc<StoreManager>,
    /// Descriptor resolver.
    resolver: ValueResolver,
    /// Navigation sink.
    navigation: Arc<dyn NavigationSink>,
    /// UI sink.
    ui: Arc<dyn UiSink>,
    /// System sink.
    system: Arc<dyn SystemSink>,
    /// HTTP client.
    http: Arc<dyn HttpClient>,
    /// Actions registered by id.
    actions: BTreeMap<ActionId, Action>,
}

impl ActionExecutor {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> ActionExecutorBuilder {
        ActionExecutorBuilder::default()
    }

    /// Executes a registered action by id.
    ///
    /// Collaborators use this callback when an alert or sheet button is
    /// activated.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::UnknownAction`] when no action carries the
    /// id, otherwise propagates like [`ActionExecutor::execute`].
    pub fn execute_by_id(&self, id: &ActionId, ctx: &EventContext) -> Result<(), ExecutorError> {
        let action = self
            .actions
            .get(id)
            .cloned()
            .ok_or_else(|| ExecutorError::UnknownAction(id.clone()))?;
        self.execute(&action, ctx)
    }

    /// Executes one action against the event context.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] per the propagation policy: resolution and
    /// store failures surface to the caller unless a lenient sequence
    /// swallows them.
    pub fn execute(&self, action: &Action, ctx: &EventContext) -> Result<(), ExecutorError> {
        match &action.body {
            ActionBody::StoreSet {
                store_ref,
                key_path,
                value,
            } => {
                let resolved = self.resolver.resolve_value(value, ctx)?;
                let store = self.store_for(store_ref, ctx)?;
                store.set(key_path.clone(), resolved)?;
                Ok(())
            }
            ActionBody::StoreRemove {
                store_ref,
                key_path,
            } => {
                let store = self.store_for(store_ref, ctx)?;
                store.remove(key_path.clone())?;
                Ok(())
            }
            ActionBody::StoreMerge {
                store_ref,
                key_path,
                value,
            } => {
                let resolved = self.resolver.resolve_value(value, ctx)?;
                let store = self.store_for(store_ref, ctx)?;
                store.merge(key_path.clone(), resolved)?;
                Ok(())
            }
            ActionBody::StoreTransaction {
                store_ref,
                actions,
            } => {
                let mut ops = Vec::new();
                self.collect_transaction_ops(actions, ctx, &mut ops)?;
                let store = self.store_for(store_ref, ctx)?;
                store.transaction(move |txn| {
                    for op in ops {
                        match op {
                            TransactionOp::Set(path, value) => txn.set(path, value)?,
                            TransactionOp::Merge(path, value) => txn.merge(path, value)?,
                            TransactionOp::Remove(path) => txn.remove(path)?,
                        }
                    }
                    Ok(())
                })?;
                Ok(())
            }
            ActionBody::NavigationPush {
                screen_id,
                params,
            } => self.navigate(NavigationIntent::Push {
                screen_id: screen_id.clone(),
                params: self.resolve_params(params, ctx)?,
            }),
            ActionBody::NavigationPop => self.navigate(NavigationIntent::Pop),
            ActionBody::NavigationReplace {
                screen_id,
                params,
            } => self.navigate(NavigationIntent::Replace {
                screen_id: screen_id.clone(),
                params: self.resolve_params(params, ctx)?,
            }),
            ActionBody::NavigationModal {
                screen_id,
                params,
            } => self.navigate(NavigationIntent::Modal {
                screen_id: screen_id.clone(),
                params: self.resolve_params(params, ctx)?,
            }),
            ActionBody::NavigationDismissModal => self.navigate(NavigationIntent::DismissModal),
            ActionBody::NavigationPopTo {
                screen_id,
            } => self.navigate(NavigationIntent::PopTo {
                screen_id: screen_id.clone(),
            }),
            ActionBody::NavigationReset {
                screen_id,
                params,
            } => self.navigate(NavigationIntent::Reset {
                screen_id: screen_id.clone(),
                params: self.resolve_params(params, ctx)?,
            }),
            ActionBody::UiShowToast {
                message,
                duration_ms,
            } => {
                let message = self.resolver.resolve_value(message, ctx)?.stringify();
                self.ui
                    .deliver(UiIntent::ShowToast {
                        message,
                        duration_ms: *duration_ms,
                    })
                    .map_err(ExecutorError::from)
            }
            ActionBody::UiShowAlert {
                title,
                message,
                buttons,
            } => {
                let intent = UiIntent::ShowAlert {
                    title: self.resolve_optional_text(title.as_ref(), ctx)?,
                    message: self.resolver.resolve_value(message, ctx)?.stringify(),
                    buttons: self.resolve_buttons(buttons, ctx)?,
                };
                self.ui.deliver(intent).map_err(ExecutorError::from)
            }
            ActionBody::UiShowSheet {
                title,
                buttons,
            } => {
                let intent = UiIntent::ShowSheet {
                    title: self.resolve_optional_text(title.as_ref(), ctx)?,
                    buttons: self.resolve_buttons(buttons, ctx)?,
                };
                self.ui.deliver(intent).map_err(ExecutorError::from)
            }
            ActionBody::UiDismissSheet => {
                self.ui.deliver(UiIntent::DismissSheet).map_err(ExecutorError::from)
            }
            ActionBody::UiShowLoading {
                message,
            } => {
                let intent = UiIntent::ShowLoading {
                    message: self.resolve_optional_text(message.as_ref(), ctx)?,
                };
                self.ui.deliver(intent).map_err(ExecutorError::from)
            }
            ActionBody::UiHideLoading => {
                self.ui.deliver(UiIntent::HideLoading).map_err(ExecutorError::from)
            }
            ActionBody::SystemShare {
                text,
                url,
            } => {
                let intent = SystemIntent::Share {
                    text: self.resolve_optional_text(text.as_ref(), ctx)?,
                    url: self.resolve_optional_text(url.as_ref(), ctx)?,
                };
                self.system.deliver(intent).map_err(ExecutorError::from)
            }
            ActionBody::SystemOpenUrl {
                url,
            } => {
                let url = self.resolver.resolve_value(url, ctx)?.stringify();
                self.system
                    .deliver(SystemIntent::OpenUrl {
                        url,
                    })
                    .map_err(ExecutorError::from)
            }
            ActionBody::SystemHaptic {
                style,
            } => self
                .system
                .deliver(SystemIntent::Haptic {
                    style: *style,
                })
                .map_err(ExecutorError::from),
            ActionBody::SystemCopyToClipboard {
                value,
            } => {
                let text = self.resolver.resolve_value(value, ctx)?.stringify();
                self.system
                    .deliver(SystemIntent::CopyToClipboard {
                        text,
                    })
                    .map_err(ExecutorError::from)
            }
            ActionBody::SystemRequestPermission {
                permission,
            } => self
                .system
                .deliver(SystemIntent::RequestPermission {
                    permission: *permission,
                })
                .map_err(ExecutorError::from),
            ActionBody::ApiRequest {
                endpoint,
                method,
                headers,
                body,
                timeout_ms,
                response_mapping,
                on_success,
                on_error,
            } => self.execute_api_request(
                endpoint,
                *method,
                headers,
                body.as_ref(),
                *timeout_ms,
                response_mapping.as_ref(),
                on_success.as_deref(),
                on_error.as_deref(),
                ctx,
            ),
            ActionBody::Sequence {
                actions,
                strategy,
                stop_on_error,
            } => self.execute_sequence(actions, *strategy, *stop_on_error, ctx),
            ActionBody::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let branch = if self.resolver.evaluate_condition(condition, ctx)? {
                    then
                } else {
                    otherwise
                };
                for nested in branch {
                    self.execute(nested, ctx)?;
                }
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Sequences
    // ------------------------------------------------------------------

    /// Runs a sequence serially or on scoped threads.
    ///
    /// Serial order is the action order. Parallel actions run concurrently;
    /// each action's store writes still serialize through the target store,
    /// and the write order between actions is unspecified by contract. With
    /// `stop_on_error` unset, failures are logged and execution continues.
    fn execute_sequence(
        &self,
        actions: &[Action],
        strategy: SequenceStrategy,
        stop_on_error: bool,
        ctx: &EventContext,
    ) -> Result<(), ExecutorError> {
        match strategy {
            SequenceStrategy::Serial => {
                for action in actions {
                    if let Err(err) = self.execute(action, ctx) {
                        if stop_on_error {
                            return Err(err);
                        }
                        warn!(error = %err, "sequence action failed; continuing");
                    }
                }
                Ok(())
            }
            SequenceStrategy::Parallel => {
                let results: Vec<Result<(), ExecutorError>> = std::thread::scope(|scope| {
                    let handles: Vec<_> = actions
                        .iter()
                        .map(|nested| scope.spawn(move || self.execute(nested, ctx)))
                        .collect();
                    handles
                        .into_iter()
                        .map(|handle| {
                            handle.join().unwrap_or_else(|_| {
                                Err(ExecutorError::InvalidOperation(
                                    "parallel action panicked".to_string(),
                                ))
                            })
                        })
                        .collect()
                });
                for result in results {
                    if let Err(err) = result {
                        if stop_on_error {
                            return Err(err);
                        }
                        warn!(error = %err, "parallel action failed; continuing");
                    }
                }
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // API requests
    // ------------------------------------------------------------------

    /// Executes an `api.request` action.
    #[allow(clippy::too_many_arguments, reason = "one call site, destructured wire fields")]
    fn execute_api_request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        headers: &[HeaderEntry],
        body: Option<&ValueDescriptor>,
        timeout_ms: Option<u64>,
        response_mapping: Option<&ResponseMapping>,
        on_success: Option<&Action>,
        on_error: Option<&Action>,
        ctx: &EventContext,
    ) -> Result<(), ExecutorError> {
        let mut resolved_headers = Vec::with_capacity(headers.len());
        for entry in headers {
            let value = self.resolver.resolve_value(&entry.value, ctx)?.stringify();
            resolved_headers.push((entry.name.clone(), value));
        }
        let body = body
            .map(|descriptor| self.resolver.resolve_value(descriptor, ctx))
            .transpose()?
            .map(|value| value.to_bare());
        let request = HttpRequest {
            method,
            url: endpoint.to_string(),
            headers: resolved_headers,
            body,
            timeout: timeout_ms.map(Duration::from_millis),
        };

        match self.http.request(request) {
            Ok(response) if response.is_success() => {
                let parsed = parse_body(&response.body);
                if let Some(mapping) = response_mapping {
                    let store = self.store_for(&mapping.store_ref, ctx)?;
                    store.set(mapping.key_path.clone(), StoreValue::from_bare(&parsed))?;
                }
                if let Some(action) = on_success {
                    let next =
                        EventContext::with_event(ctx.scenario_id.clone(), json!({"value": parsed}));
                    self.execute(action, &next)?;
                }
                Ok(())
            }
            Ok(response) => self.handle_api_failure(
                Some(response.status),
                format!("http status {}", response.status),
                BackendError::Http(response.status),
                on_error,
                ctx,
            ),
            Err(err) => {
                let message = err.to_string();
                self.handle_api_failure(None, message, err, on_error, ctx)
            }
        }
    }

    /// Routes an API failure into `onError` or re-raises it.
    fn handle_api_failure(
        &self,
        status: Option<u16>,
        message: String,
        err: BackendError,
        on_error: Option<&Action>,
        ctx: &EventContext,
    ) -> Result<(), ExecutorError> {
        let Some(action) = on_error else {
            return Err(ExecutorError::Backend(err));
        };
        let mut payload = serde_json::Map::new();
        if let Some(status) = status {
            payload.insert("status".to_string(), Value::from(status));
        }
        payload.insert("message".to_string(), Value::String(message));
        let next = EventContext::with_event(
            ctx.scenario_id.clone(),
            json!({"value": Value::Object(payload)}),
        );
        self.execute(action, &next)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Resolves the store referenced by an action.
    fn store_for(
        &self,
        store_ref: &StoreRef,
        ctx: &EventContext,
    ) -> Result<Arc<backdrop_store::KeyValueStore>, ExecutorError> {
        let key = store_ref.resolve(&ctx.scenario_id);
        Ok(self.stores.get_store(key.scope, key.storage)?)
    }

    /// Pre-resolves nested store actions into transaction operations.
    ///
    /// Only store mutations (and serial control flow over them) are legal
    /// inside a transaction; anything else is an ill-formed action.
    fn collect_transaction_ops(
        &self,
        actions: &[Action],
        ctx: &EventContext,
        ops: &mut Vec<TransactionOp>,
    ) -> Result<(), ExecutorError> {
        for action in actions {
            match &action.body {
                ActionBody::StoreSet {
                    key_path,
                    value,
                    ..
                } => {
                    let resolved = self.resolver.resolve_value(value, ctx)?;
                    ops.push(TransactionOp::Set(key_path.clone(), resolved));
                }
                ActionBody::StoreMerge {
                    key_path,
                    value,
                    ..
                } => {
                    let resolved = self.resolver.resolve_value(value, ctx)?;
                    ops.push(TransactionOp::Merge(key_path.clone(), resolved));
                }
                ActionBody::StoreRemove {
                    key_path,
                    ..
                } => ops.push(TransactionOp::Remove(key_path.clone())),
                ActionBody::Sequence {
                    actions: nested,
                    strategy: SequenceStrategy::Serial,
                    ..
                } => self.collect_transaction_ops(nested, ctx, ops)?,
                ActionBody::Conditional {
                    condition,
                    then,
                    otherwise,
                } => {
                    let branch = if self.resolver.evaluate_condition(condition, ctx)? {
                        then
                    } else {
                        otherwise
                    };
                    self.collect_transaction_ops(branch, ctx, ops)?;
                }
                _ => {
                    return Err(ExecutorError::InvalidOperation(
                        "only store actions may run inside store.transaction".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Delivers a navigation intent.
    fn navigate(&self, intent: NavigationIntent) -> Result<(), ExecutorError> {
        self.navigation.deliver(intent).map_err(ExecutorError::from)
    }

    /// Resolves navigation parameters into concrete values.
    fn resolve_params(
        &self,
        params: &[NavigationParam],
        ctx: &EventContext,
    ) -> Result<BTreeMap<String, StoreValue>, ExecutorError> {
        let mut resolved = BTreeMap::new();
        for param in params {
            resolved.insert(param.name.clone(), self.resolver.resolve_value(&param.value, ctx)?);
        }
        Ok(resolved)
    }

    /// Resolves an optional text descriptor.
    fn resolve_optional_text(
        &self,
        descriptor: Option<&ValueDescriptor>,
        ctx: &EventContext,
    ) -> Result<Option<String>, ExecutorError> {
        descriptor
            .map(|descriptor| {
                self.resolver.resolve_value(descriptor, ctx).map(|value| value.stringify())
            })
            .transpose()
            .map_err(ExecutorError::from)
    }

    /// Resolves alert/sheet buttons, keeping nested actions for callbacks.
    fn resolve_buttons(
        &self,
        buttons: &[ActionButton],
        ctx: &EventContext,
    ) -> Result<Vec<ResolvedButton>, ExecutorError> {
        buttons
            .iter()
            .map(|button| {
                Ok(ResolvedButton {
                    label: self.resolver.resolve_value(&button.label, ctx)?.stringify(),
                    role: button.role,
                    action: button.action.clone(),
                })
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a response body as JSON, falling back to a string payload.
fn parse_body(body: &str) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
