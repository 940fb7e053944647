// crates/backdrop-core/src/core/action.rs
// ============================================================================
// Module: Backdrop Actions
// Description: Declarative action schema dispatched by the executor.
// Purpose: Define the tagged action tree decoded from scenario documents.
// Dependencies: crate::core::{descriptor, keypath}, serde
// ============================================================================

//! ## Overview
//! Actions are tagged declarative commands. Store actions mutate a store,
//! navigation/UI/system actions emit intents to external sinks, `api.request`
//! performs an HTTP call through the injected client, and `sequence` /
//! `conditional` provide control flow. The executor walks this tree; this
//! module only defines the wire schema.
//!
//! Wire tags use the dotted forms (`store.set`, `navigation.push`, ...)
//! carried by scenario documents.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::descriptor::ConditionDescriptor;
use crate::core::descriptor::StoreRef;
use crate::core::descriptor::ValueDescriptor;
use crate::core::keypath::KeyPath;

// ============================================================================
// SECTION: Action Envelope
// ============================================================================

/// Action identifier used for registry lookup and logging.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Creates a new action identifier.
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

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ActionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Declarative action: an optional identifier plus the tagged body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Optional stable identifier for registry lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ActionId>,
    /// Tagged action body.
    #[serde(flatten)]
    pub body: ActionBody,
}

impl Action {
    /// Creates an anonymous action from a body.
    #[must_use]
    pub const fn anonymous(body: ActionBody) -> Self {
        Self {
            id: None,
            body,
        }
    }
}

impl From<ActionBody> for Action {
    fn from(body: ActionBody) -> Self {
        Self::anonymous(body)
    }
}

// ============================================================================
// SECTION: Action Body
// ============================================================================

/// Tagged action body.
///
/// # Invariants
/// - Wire tags are stable; unknown tags fail scenario decoding with a typed,
///   positioned error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ActionBody {
    /// Resolve a value and write it at a store path.
    #[serde(rename = "store.set")]
    StoreSet {
        /// Target store.
        #[serde(default, rename = "storeRef")]
        store_ref: StoreRef,
        /// Path to write.
        #[serde(rename = "keyPath")]
        key_path: KeyPath,
        /// Value recipe.
        value: ValueDescriptor,
    },
    /// Remove the value at a store path.
    #[serde(rename = "store.remove")]
    StoreRemove {
        /// Target store.
        #[serde(default, rename = "storeRef")]
        store_ref: StoreRef,
        /// Path to remove.
        #[serde(rename = "keyPath")]
        key_path: KeyPath,
    },
    /// Resolve an object and shallow-merge it at a store path.
    #[serde(rename = "store.merge")]
    StoreMerge {
        /// Target store.
        #[serde(default, rename = "storeRef")]
        store_ref: StoreRef,
        /// Path to merge into.
        #[serde(rename = "keyPath")]
        key_path: KeyPath,
        /// Value recipe; must resolve to an object.
        value: ValueDescriptor,
    },
    /// Execute nested actions atomically against one store.
    #[serde(rename = "store.transaction")]
    StoreTransaction {
        /// Store the transaction runs on.
        #[serde(default, rename = "storeRef")]
        store_ref: StoreRef,
        /// Nested actions executed inside the transaction.
        actions: Vec<Action>,
    },
    /// Push a screen onto the navigation stack.
    #[serde(rename = "navigation.push")]
    NavigationPush {
        /// Destination screen identifier.
        #[serde(rename = "screenId")]
        screen_id: String,
        /// Resolved screen parameters.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        params: Vec<NavigationParam>,
    },
    /// Pop the top screen.
    #[serde(rename = "navigation.pop")]
    NavigationPop,
    /// Replace the top screen.
    #[serde(rename = "navigation.replace")]
    NavigationReplace {
        /// Destination screen identifier.
        #[serde(rename = "screenId")]
        screen_id: String,
        /// Resolved screen parameters.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        params: Vec<NavigationParam>,
    },
    /// Present a screen modally.
    #[serde(rename = "navigation.modal")]
    NavigationModal {
        /// Destination screen identifier.
        #[serde(rename = "screenId")]
        screen_id: String,
        /// Resolved screen parameters.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        params: Vec<NavigationParam>,
    },
    /// Dismiss the current modal.
    #[serde(rename = "navigation.dismissModal")]
    NavigationDismissModal,
    /// Pop back to a screen already on the stack.
    #[serde(rename = "navigation.popTo")]
    NavigationPopTo {
        /// Screen identifier to pop back to.
        #[serde(rename = "screenId")]
        screen_id: String,
    },
    /// Reset the stack to a root screen.
    #[serde(rename = "navigation.reset")]
    NavigationReset {
        /// New root screen identifier.
        #[serde(rename = "screenId")]
        screen_id: String,
        /// Resolved screen parameters.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        params: Vec<NavigationParam>,
    },
    /// Show a transient toast.
    #[serde(rename = "ui.showToast")]
    UiShowToast {
        /// Toast message recipe.
        message: ValueDescriptor,
        /// Display duration in milliseconds.
        #[serde(default, rename = "durationMs", skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
    /// Show an alert with buttons.
    #[serde(rename = "ui.showAlert")]
    UiShowAlert {
        /// Alert title recipe.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<ValueDescriptor>,
        /// Alert message recipe.
        message: ValueDescriptor,
        /// Buttons with optional nested actions.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        buttons: Vec<ActionButton>,
    },
    /// Show a bottom sheet with buttons.
    #[serde(rename = "ui.showSheet")]
    UiShowSheet {
        /// Sheet title recipe.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<ValueDescriptor>,
        /// Buttons with optional nested actions.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        buttons: Vec<ActionButton>,
    },
    /// Dismiss the current sheet.
    #[serde(rename = "ui.dismissSheet")]
    UiDismissSheet,
    /// Show a blocking loading indicator.
    #[serde(rename = "ui.showLoading")]
    UiShowLoading {
        /// Optional loading message recipe.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<ValueDescriptor>,
    },
    /// Hide the loading indicator.
    #[serde(rename = "ui.hideLoading")]
    UiHideLoading,
    /// Open the system share sheet.
    #[serde(rename = "system.share")]
    SystemShare {
        /// Optional text to share.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<ValueDescriptor>,
        /// Optional URL to share.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<ValueDescriptor>,
    },
    /// Open a URL outside the app.
    #[serde(rename = "system.openUrl")]
    SystemOpenUrl {
        /// URL recipe.
        url: ValueDescriptor,
    },
    /// Trigger haptic feedback.
    #[serde(rename = "system.haptic")]
    SystemHaptic {
        /// Haptic style.
        style: HapticStyle,
    },
    /// Copy a resolved value to the clipboard.
    #[serde(rename = "system.copyToClipboard")]
    SystemCopyToClipboard {
        /// Value recipe; stringified before copying.
        value: ValueDescriptor,
    },
    /// Request a system permission.
    #[serde(rename = "system.requestPermission")]
    SystemRequestPermission {
        /// Permission to request.
        permission: PermissionKind,
    },
    /// Perform an HTTP request through the injected client.
    #[serde(rename = "api.request")]
    ApiRequest {
        /// Request endpoint (absolute, or relative to the client's base).
        endpoint: String,
        /// HTTP method.
        method: HttpMethod,
        /// Header recipes, resolved then stringified.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        headers: Vec<HeaderEntry>,
        /// Optional body recipe, sent as bare JSON.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<ValueDescriptor>,
        /// Optional request timeout in milliseconds.
        #[serde(default, rename = "timeoutMs", skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
        /// Optional mapping of the parsed response body into a store.
        #[serde(default, rename = "responseMapping", skip_serializing_if = "Option::is_none")]
        response_mapping: Option<ResponseMapping>,
        /// Action executed on 2xx with the parsed body as event data.
        #[serde(default, rename = "onSuccess", skip_serializing_if = "Option::is_none")]
        on_success: Option<Box<Action>>,
        /// Action executed on failure with the error as event data.
        #[serde(default, rename = "onError", skip_serializing_if = "Option::is_none")]
        on_error: Option<Box<Action>>,
    },
    /// Run nested actions in order or concurrently.
    #[serde(rename = "sequence")]
    Sequence {
        /// Nested actions.
        actions: Vec<Action>,
        /// Execution strategy.
        #[serde(default)]
        strategy: SequenceStrategy,
        /// Abort remaining actions on first failure.
        #[serde(default, rename = "stopOnError")]
        stop_on_error: bool,
    },
    /// Branch on a condition.
    #[serde(rename = "conditional")]
    Conditional {
        /// Condition to evaluate.
        condition: ConditionDescriptor,
        /// Branch executed when the condition holds.
        then: Vec<Action>,
        /// Branch executed otherwise.
        #[serde(default, rename = "else", skip_serializing_if = "Vec::is_empty")]
        otherwise: Vec<Action>,
    },
}

// ============================================================================
// SECTION: Action Payload Pieces
// ============================================================================

/// Named navigation parameter with a value recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationParam {
    /// Parameter name.
    pub name: String,
    /// Parameter value recipe.
    pub value: ValueDescriptor,
}

/// Alert or sheet button carrying an optional nested action.
///
/// When the collaborator reports the button activation it calls back into the
/// executor with this action and the original event context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionButton {
    /// Button label recipe.
    pub label: ValueDescriptor,
    /// Visual role hint for the collaborator.
    #[serde(default)]
    pub role: ButtonRole,
    /// Action executed when the button is activated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

/// Visual role hint for alert and sheet buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ButtonRole {
    /// Default button appearance.
    #[default]
    Default,
    /// Cancel emphasis.
    Cancel,
    /// Destructive emphasis.
    Destructive,
}

/// Header name plus value recipe for `api.request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderEntry {
    /// Header name.
    pub name: String,
    /// Header value recipe; stringified after resolution.
    pub value: ValueDescriptor,
}

/// Mapping of a parsed response body into a store path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMapping {
    /// Target store.
    #[serde(default)]
    pub store_ref: StoreRef,
    /// Path the parsed body is written to.
    pub key_path: KeyPath,
}

/// HTTP method for `api.request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP PATCH.
    Patch,
    /// HTTP DELETE.
    Delete,
    /// HTTP HEAD.
    Head,
}

impl HttpMethod {
    /// Returns the canonical method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Haptic feedback style for `system.haptic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticStyle {
    /// Light impact.
    Light,
    /// Medium impact.
    Medium,
    /// Heavy impact.
    Heavy,
    /// Success notification.
    Success,
    /// Warning notification.
    Warning,
    /// Error notification.
    Error,
}

/// Permission kinds for `system.requestPermission`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    /// Camera access.
    Camera,
    /// Microphone access.
    Microphone,
    /// Location access.
    Location,
    /// Push notifications.
    Notifications,
    /// Photo library access.
    Photos,
}

/// Execution strategy for `sequence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStrategy {
    /// Actions run one after another in order.
    #[default]
    Serial,
    /// Actions run concurrently; write order between them is unspecified.
    Parallel,
}
