// crates/backdrop-core/src/core/mod.rs
// ============================================================================
// Module: Backdrop Core Types
// Description: Canonical value, path, patch, and action schema structures.
// Purpose: Provide stable, serializable types for stores and the action runtime.
// Dependencies: serde, serde_json, url, uuid
// ============================================================================

//! ## Overview
//! Backdrop core types define the store value model, key-path addressing,
//! mutation records, scopes and storage tags, descriptors, actions, and the
//! scenario document. These types are the canonical source of truth for any
//! derived API surface.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod action;
pub mod descriptor;
pub mod keypath;
pub mod patch;
pub mod scenario;
pub mod scope;
pub mod value;
pub mod version;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use action::Action;
pub use action::ActionBody;
pub use action::ActionButton;
pub use action::ActionId;
pub use action::ButtonRole;
pub use action::HapticStyle;
pub use action::HeaderEntry;
pub use action::HttpMethod;
pub use action::NavigationParam;
pub use action::PermissionKind;
pub use action::ResponseMapping;
pub use action::SequenceStrategy;
pub use descriptor::ComputedOp;
pub use descriptor::ConditionDescriptor;
pub use descriptor::ScopeSelector;
pub use descriptor::StorageSelector;
pub use descriptor::StoreRef;
pub use descriptor::ValueDescriptor;
pub use keypath::KeyPath;
pub use keypath::KeyPathError;
pub use keypath::Segment;
pub use keypath::Step;
pub use keypath::dependency_overlaps;
pub use keypath::matches_wildcard;
pub use patch::Change;
pub use patch::Patch;
pub use patch::PatchOp;
pub use scenario::ScenarioDocument;
pub use scenario::ScenarioError;
pub use scenario::StoreDescriptor;
pub use scope::ScenarioId;
pub use scope::Scope;
pub use scope::Storage;
pub use scope::StoreKey;
pub use value::StoreValue;
pub use value::ValueDecodeError;
pub use value::ValueKind;
pub use value::is_color_literal;
pub use version::SemanticVersion;
pub use version::VersionError;
