// crates/backdrop-validation/src/lib.rs
// ============================================================================
// Module: Backdrop Validation Library
// Description: Public API surface for Backdrop validation.
// Purpose: Expose the schema engine, custom validators, and the store adapter.
// Dependencies: crate::{custom, engine, formats, result, sanitize, schema, store_adapter}
// ============================================================================

//! ## Overview
//! Backdrop validation gates inbound configuration: a depth- and
//! budget-limited schema engine, a registry of custom business and security
//! validators, an input sanitizer, and the adapter that translates per-path
//! store rules into engine schemas. Results are structured issues, never
//! panics.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod custom;
pub mod engine;
pub mod formats;
pub mod result;
pub mod sanitize;
pub mod schema;
pub mod store_adapter;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use custom::CustomValidator;
pub use custom::ValidatorRegistry;
pub use custom::business::BusinessRule;
pub use custom::business::BusinessRuleValidator;
pub use custom::color::ColorValidator;
pub use custom::component::ComponentTypeValidator;
pub use custom::security::CODE_SECURITY_THREAT;
pub use custom::security::CODE_SECURITY_VIOLATION;
pub use custom::security::SecurityConfig;
pub use custom::security::SecurityValidator;
pub use custom::url::UrlValidator;
pub use custom::url::UrlValidatorConfig;
pub use engine::SchemaValidator;
pub use engine::ValidatorConfig;
pub use result::BatchItemOutcome;
pub use result::BatchReport;
pub use result::Severity;
pub use result::ValidationIssue;
pub use result::ValidationResult;
pub use sanitize::InputSanitizer;
pub use sanitize::SanitizerConfig;
pub use schema::AdditionalProperties;
pub use schema::Schema;
pub use schema::SchemaNode;
pub use schema::SchemaType;
pub use schema::StringFormat;
pub use store_adapter::StoreRuleAdapter;
pub use store_adapter::ValidationMode;
pub use store_adapter::ValidationOptions;
pub use store_adapter::ValidationRule;
pub use store_adapter::WriteDecision;
pub use store_adapter::schema_for_rule;
