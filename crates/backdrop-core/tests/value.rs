// crates/backdrop-core/tests/value.rs
// ============================================================================
// Module: Store Value Tests
// Description: Tests for wire encodings, inference, and coercion.
// Purpose: Validate the tagged/bare forms and lenient coercion rules.
// Dependencies: backdrop-core, serde_json
// ============================================================================
//! ## Overview
//! Ensures bare decoding infers color and URL tags from string shape, the
//! tagged form round-trips deterministically, equality stays tag-sensitive,
//! and coercion follows the documented conversions only.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use backdrop_core::StoreValue;
use backdrop_core::ValueKind;
use serde_json::json;

/// Verifies bare strings infer color and URL tags by shape.
#[test]
fn bare_decoding_infers_string_tags() {
    assert_eq!(
        StoreValue::from_bare(&json!("#ff0000")),
        StoreValue::Color("#ff0000".to_string())
    );
    assert_eq!(
        StoreValue::from_bare(&json!("#ff0000aa")),
        StoreValue::Color("#ff0000aa".to_string())
    );
    assert_eq!(
        StoreValue::from_bare(&json!("https://example.com/a")),
        StoreValue::Url("https://example.com/a".to_string())
    );
    assert_eq!(
        StoreValue::from_bare(&json!("plain text")),
        StoreValue::String("plain text".to_string())
    );
    assert_eq!(StoreValue::from_bare(&json!("#ff00")), StoreValue::String("#ff00".to_string()));
}

/// Verifies bare numbers split into integer and number tags.
#[test]
fn bare_decoding_splits_numbers() {
    assert_eq!(StoreValue::from_bare(&json!(7)), StoreValue::Integer(7));
    assert_eq!(StoreValue::from_bare(&json!(7.5)), StoreValue::Number(7.5));
}

/// Verifies the tagged form round-trips through encode and decode.
#[test]
fn tagged_form_roundtrips() {
    let value = StoreValue::Object(
        [
            ("name".to_string(), StoreValue::String("Ada".to_string())),
            ("age".to_string(), StoreValue::Integer(36)),
            ("tint".to_string(), StoreValue::Color("#336699".to_string())),
            (
                "tags".to_string(),
                StoreValue::Array(vec![StoreValue::Bool(true), StoreValue::Null]),
            ),
        ]
        .into_iter()
        .collect(),
    );
    let encoded = value.to_tagged();
    assert_eq!(StoreValue::from_tagged(&encoded).unwrap(), value);
}

/// Verifies tagged decoding rejects unknown tags and shape mismatches.
#[test]
fn tagged_decoding_fails_closed() {
    assert!(StoreValue::from_tagged(&json!({"type": "mystery", "value": 1})).is_err());
    assert!(StoreValue::from_tagged(&json!({"type": "integer", "value": "ten"})).is_err());
    assert!(StoreValue::from_tagged(&json!({"type": "color", "value": "red"})).is_err());
    assert!(StoreValue::from_tagged(&json!(42)).is_err());
}

/// Verifies equality stays tag-sensitive across numeric encodings.
#[test]
fn deep_equal_is_tag_sensitive() {
    assert!(!StoreValue::Integer(1).deep_equal(&StoreValue::Number(1.0)));
    assert!(StoreValue::Integer(1).deep_equal(&StoreValue::Integer(1)));
}

/// Verifies the documented coercions and nothing else.
#[test]
fn coercion_follows_the_documented_table() {
    assert_eq!(
        StoreValue::String("8080".to_string()).coerce(ValueKind::Integer),
        Some(StoreValue::Integer(8080))
    );
    assert_eq!(
        StoreValue::String("2.5".to_string()).coerce(ValueKind::Number),
        Some(StoreValue::Number(2.5))
    );
    assert_eq!(
        StoreValue::Number(9.9).coerce(ValueKind::Integer),
        Some(StoreValue::Integer(9))
    );
    assert_eq!(
        StoreValue::Integer(3).coerce(ValueKind::String),
        Some(StoreValue::String("3".to_string()))
    );
    assert_eq!(
        StoreValue::String("yes".to_string()).coerce(ValueKind::Bool),
        Some(StoreValue::Bool(true))
    );
    assert_eq!(
        StoreValue::String("0".to_string()).coerce(ValueKind::Bool),
        Some(StoreValue::Bool(false))
    );
    assert_eq!(
        StoreValue::String("#abcdef".to_string()).coerce(ValueKind::Color),
        Some(StoreValue::Color("#abcdef".to_string()))
    );
    assert!(StoreValue::String("maybe".to_string()).coerce(ValueKind::Bool).is_none());
    assert!(StoreValue::String("nope".to_string()).coerce(ValueKind::Color).is_none());
    assert!(StoreValue::Bool(true).coerce(ValueKind::Integer).is_none());
    assert!(StoreValue::Integer(1).coerce(ValueKind::Object).is_none());
}

/// Verifies stringification of each tag family.
#[test]
fn stringify_renders_natural_forms() {
    assert_eq!(StoreValue::Number(60.5).stringify(), "60.5");
    assert_eq!(StoreValue::Integer(-3).stringify(), "-3");
    assert_eq!(StoreValue::Bool(false).stringify(), "false");
    assert_eq!(StoreValue::Null.stringify(), "");
    assert_eq!(
        StoreValue::Array(vec![StoreValue::Integer(1), StoreValue::Integer(2)]).stringify(),
        "[1,2]"
    );
}
