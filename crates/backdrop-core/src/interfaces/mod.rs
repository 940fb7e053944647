// crates/backdrop-core/src/interfaces/mod.rs
// ============================================================================
// Module: Backdrop Interfaces
// Description: Backend-agnostic contracts for storage, HTTP, and side effects.
// Purpose: Define the surfaces the store and action runtime integrate through.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The core never renders screens, owns a screen stack, or talks to the
//! network directly. Navigation, UI, and system effects leave the core as
//! typed intents delivered to sink implementations; persistence goes through
//! [`StorageBackend`]; HTTP goes through [`HttpClient`]. Implementations are
//! injected collaborators, never global state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::action::Action;
use crate::core::action::ButtonRole;
use crate::core::action::HapticStyle;
use crate::core::action::HttpMethod;
use crate::core::action::PermissionKind;
use crate::core::keypath::KeyPath;
use crate::core::patch::Change;
use crate::core::scope::ScenarioId;
use crate::core::value::StoreValue;

// ============================================================================
// SECTION: Backend Errors
// ============================================================================

/// Errors surfaced by storage backends, the remote client, and HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Transport-level failure (connect, read, write).
    #[error("backend transport error: {0}")]
    Transport(String),
    /// Non-2xx HTTP status.
    #[error("backend http status {0}")]
    Http(u16),
    /// Request or I/O timeout.
    #[error("backend timeout")]
    Timeout,
    /// Payload decoding failure.
    #[error("backend decode error: {0}")]
    Decode(String),
}

// ============================================================================
// SECTION: Storage Backend
// ============================================================================

/// Persistent state exchanged with a storage backend.
///
/// Entries are keyed by path; top-level keys for flat snapshots, dotted
/// paths for initial-value seeds.
pub type BackendState = BTreeMap<KeyPath, StoreValue>;

/// Physical storage backing for one store instance.
pub trait StorageBackend: Send + Sync {
    /// Loads the backend's current state.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the state exists but cannot be read or
    /// decoded. A missing state loads as an empty map.
    fn load(&self) -> Result<BackendState, BackendError>;

    /// Persists the full state snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the snapshot cannot be written.
    fn save(&self, state: &BackendState) -> Result<(), BackendError>;

    /// Clears the persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when clearing fails.
    fn clear(&self) -> Result<(), BackendError>;

    /// Indicates whether the backing medium tolerates concurrent access.
    fn supports_concurrent_access(&self) -> bool;
}

// ============================================================================
// SECTION: Remote Store Client
// ============================================================================

/// Client for the opaque remote store backend.
///
/// Retries and backoff are the remote collaborator's concern; the client
/// reports one error kind per failed call.
pub trait RemoteStoreClient: Send + Sync {
    /// Fetches the remote state for a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport failure, non-2xx status, or a
    /// payload that does not decode as tagged values.
    fn pull(
        &self,
        namespace: &str,
        scenario_id: Option<&ScenarioId>,
    ) -> Result<BackendState, BackendError>;

    /// Pushes local changes to the remote store.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport failure or non-2xx status.
    fn push(
        &self,
        namespace: &str,
        scenario_id: Option<&ScenarioId>,
        changes: &[Change],
    ) -> Result<(), BackendError>;
}

// ============================================================================
// SECTION: Sink Errors
// ============================================================================

/// Errors reported by intent sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Sink failed to deliver the intent.
    #[error("intent delivery failed: {0}")]
    DeliveryFailed(String),
}

// ============================================================================
// SECTION: Navigation Intents
// ============================================================================

/// Resolved navigation side-effect request.
///
/// # Invariants
/// - Parameters are fully resolved values; sinks never see descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NavigationIntent {
    /// Push a screen.
    Push {
        /// Destination screen identifier.
        #[serde(rename = "screenId")]
        screen_id: String,
        /// Resolved parameters.
        params: BTreeMap<String, StoreValue>,
    },
    /// Pop the top screen.
    Pop,
    /// Replace the top screen.
    Replace {
        /// Destination screen identifier.
        #[serde(rename = "screenId")]
        screen_id: String,
        /// Resolved parameters.
        params: BTreeMap<String, StoreValue>,
    },
    /// Present a screen modally.
    Modal {
        /// Destination screen identifier.
        #[serde(rename = "screenId")]
        screen_id: String,
        /// Resolved parameters.
        params: BTreeMap<String, StoreValue>,
    },
    /// Dismiss the current modal.
    DismissModal,
    /// Pop back to an existing screen.
    PopTo {
        /// Screen identifier to pop back to.
        #[serde(rename = "screenId")]
        screen_id: String,
    },
    /// Reset the stack to a root screen.
    Reset {
        /// New root screen identifier.
        #[serde(rename = "screenId")]
        screen_id: String,
        /// Resolved parameters.
        params: BTreeMap<String, StoreValue>,
    },
}

/// External navigator consuming navigation intents.
pub trait NavigationSink: Send + Sync {
    /// Delivers a navigation intent.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the intent cannot be delivered.
    fn deliver(&self, intent: NavigationIntent) -> Result<(), SinkError>;
}

// ============================================================================
// SECTION: UI Intents
// ============================================================================

/// Resolved button inside an alert or sheet intent.
///
/// The collaborator calls back `execute(action, event_data)` when the button
/// is activated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedButton {
    /// Resolved button label.
    pub label: String,
    /// Visual role hint.
    pub role: ButtonRole,
    /// Action to execute on activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

/// Resolved UI side-effect request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UiIntent {
    /// Transient toast.
    ShowToast {
        /// Resolved message text.
        message: String,
        /// Display duration in milliseconds.
        #[serde(default, rename = "durationMs", skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
    /// Alert dialog.
    ShowAlert {
        /// Resolved title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Resolved message text.
        message: String,
        /// Alert buttons.
        buttons: Vec<ResolvedButton>,
    },
    /// Bottom sheet.
    ShowSheet {
        /// Resolved title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Sheet buttons.
        buttons: Vec<ResolvedButton>,
    },
    /// Dismiss the current sheet.
    DismissSheet,
    /// Blocking loading indicator.
    ShowLoading {
        /// Resolved message text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Hide the loading indicator.
    HideLoading,
}

/// External UI collaborator consuming UI intents.
pub trait UiSink: Send + Sync {
    /// Delivers a UI intent.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the intent cannot be delivered.
    fn deliver(&self, intent: UiIntent) -> Result<(), SinkError>;
}

// ============================================================================
// SECTION: System Intents
// ============================================================================

/// Resolved system side-effect request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SystemIntent {
    /// System share sheet.
    Share {
        /// Resolved text to share.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        /// Resolved URL to share.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// Open a URL outside the app.
    OpenUrl {
        /// Resolved URL.
        url: String,
    },
    /// Haptic feedback.
    Haptic {
        /// Haptic style.
        style: HapticStyle,
    },
    /// Copy text to the clipboard.
    CopyToClipboard {
        /// Resolved text.
        text: String,
    },
    /// Request a system permission.
    RequestPermission {
        /// Permission to request.
        permission: PermissionKind,
    },
}

/// External system collaborator consuming system intents.
pub trait SystemSink: Send + Sync {
    /// Delivers a system intent.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the intent cannot be delivered.
    fn deliver(&self, intent: SystemIntent) -> Result<(), SinkError>;
}

// ============================================================================
// SECTION: HTTP Client
// ============================================================================

/// Outbound HTTP request issued by `api.request`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Resolved header pairs.
    pub headers: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Optional per-request timeout.
    pub timeout: Option<Duration>,
}

/// HTTP response returned to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response status code.
    pub status: u16,
    /// Raw response body text.
    pub body: String,
}

impl HttpResponse {
    /// Indicates a 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Injected HTTP client used by `api.request` and the remote store client.
pub trait HttpClient: Send + Sync {
    /// Performs a request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Timeout`] on timeout and
    /// [`BackendError::Transport`] on any other transport failure. Non-2xx
    /// statuses are returned as responses, not errors.
    fn request(&self, request: HttpRequest) -> Result<HttpResponse, BackendError>;
}
