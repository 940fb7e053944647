// crates/backdrop-validation/src/custom/color.rs
// ============================================================================
// Module: Backdrop Color Validator
// Description: Hex color shape validation.
// Purpose: Require `#RRGGBB` or `#RRGGBBAA` for scenario color values.
// Dependencies: backdrop-core, crate::{custom, result}, serde_json
// ============================================================================

//! ## Overview
//! Colors cross the wire as strings; only the two hex shapes the renderer
//! understands are accepted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use backdrop_core::is_color_literal;
use serde_json::Value;

use crate::custom::CustomValidator;
use crate::result::Severity;
use crate::result::ValidationIssue;
use crate::result::ValidationResult;

// ============================================================================
// SECTION: Issue Codes
// ============================================================================

/// String is not a `#RRGGBB` / `#RRGGBBAA` color.
pub const CODE_COLOR_INVALID: &str = "COLOR_INVALID";

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Hex color shape validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorValidator;

impl CustomValidator for ColorValidator {
    fn name(&self) -> &str {
        "color"
    }

    fn validate(&self, value: &Value, path: &str) -> ValidationResult {
        match value {
            Value::String(text) if is_color_literal(text) => ValidationResult::valid(),
            Value::String(text) => ValidationResult::failure(ValidationIssue::new(
                CODE_COLOR_INVALID,
                format!("not a hex color: {text}"),
                path,
                Severity::Error,
            )),
            _ => ValidationResult::failure(ValidationIssue::new(
                CODE_COLOR_INVALID,
                "expected a hex color string".to_string(),
                path,
                Severity::Error,
            )),
        }
    }
}
