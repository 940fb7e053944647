// crates/backdrop-validation/tests/engine.rs
// ============================================================================
// Module: Schema Engine Tests
// Description: Tests for the depth- and budget-limited schema engine.
// Purpose: Validate constraints, combinators, references, and limits.
// Dependencies: backdrop-validation, serde_json
// ============================================================================
//! ## Overview
//! Exercises each constraint family against accepting and rejecting values,
//! resolves `$ref` pointers, and confirms both traversal limits stop the
//! walk with a single terminal issue.

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

use backdrop_validation::Schema;
use backdrop_validation::SchemaValidator;
use backdrop_validation::ValidatorConfig;
use backdrop_validation::engine::CODE_DEPTH_LIMIT;
use backdrop_validation::engine::CODE_ERROR_LIMIT;
use backdrop_validation::engine::CODE_FORMAT_INVALID;
use backdrop_validation::engine::CODE_ONE_OF_FAILED;
use backdrop_validation::engine::CODE_REF_UNRESOLVED;
use backdrop_validation::engine::CODE_REQUIRED_MISSING;
use backdrop_validation::engine::CODE_TYPE_MISMATCH;
use serde_json::json;

/// Parses a schema from JSON.
fn schema(raw: serde_json::Value) -> Schema {
    serde_json::from_value(raw).unwrap()
}

/// Verifies type, required, and property constraints on objects.
#[test]
fn object_constraints_are_enforced() {
    let schema = schema(json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": { "type": "string", "minLength": 1 },
            "age": { "type": "integer", "minimum": 0 }
        },
        "additionalProperties": false
    }));
    let validator = SchemaValidator::default();

    assert!(validator.validate(&json!({"name": "Ada", "age": 36}), &schema).is_valid());

    let result = validator.validate(&json!({"age": -1, "extra": true}), &schema);
    assert!(!result.is_valid());
    let codes: Vec<&str> = result.issues.iter().map(|issue| issue.code.as_str()).collect();
    assert!(codes.contains(&CODE_REQUIRED_MISSING));
    assert!(codes.contains(&"MINIMUM"));
    assert!(codes.contains(&"ADDITIONAL_PROPERTY"));
}

/// Verifies enum, const, and string constraints.
#[test]
fn scalar_constraints_are_enforced() {
    let validator = SchemaValidator::default();

    let palette = schema(json!({"enum": ["red", "green", "blue"]}));
    assert!(validator.validate(&json!("green"), &palette).is_valid());
    assert!(!validator.validate(&json!("mauve"), &palette).is_valid());

    let pinned = schema(json!({"const": 42}));
    assert!(validator.validate(&json!(42), &pinned).is_valid());
    assert!(!validator.validate(&json!(41), &pinned).is_valid());

    let shaped = schema(json!({"type": "string", "pattern": "^[a-z]+$", "maxLength": 5}));
    assert!(validator.validate(&json!("abc"), &shaped).is_valid());
    assert!(!validator.validate(&json!("toolong"), &shaped).is_valid());
    assert!(!validator.validate(&json!("UPPER"), &shaped).is_valid());
}

/// Verifies the combinators.
#[test]
fn combinators_compose() {
    let validator = SchemaValidator::default();

    let all = schema(json!({"allOf": [{"type": "integer"}, {"minimum": 10}]}));
    assert!(validator.validate(&json!(12), &all).is_valid());
    assert!(!validator.validate(&json!(5), &all).is_valid());

    let any = schema(json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}));
    assert!(validator.validate(&json!("ok"), &any).is_valid());
    assert!(!validator.validate(&json!(true), &any).is_valid());

    let one = schema(json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]}));
    let result = validator.validate(&json!(3), &one);
    assert!(result.issues.iter().any(|issue| issue.code == CODE_ONE_OF_FAILED));

    let not = schema(json!({"not": {"type": "string"}}));
    assert!(validator.validate(&json!(1), &not).is_valid());
    assert!(!validator.validate(&json!("nope"), &not).is_valid());
}

/// Verifies `$ref` resolution into definitions.
#[test]
fn references_resolve_into_definitions() {
    let schema = schema(json!({
        "definitions": {
            "port": { "type": "integer", "minimum": 1, "maximum": 65535 }
        },
        "type": "object",
        "properties": { "port": { "$ref": "#/definitions/port" } }
    }));
    let validator = SchemaValidator::default();
    assert!(validator.validate(&json!({"port": 8080}), &schema).is_valid());
    assert!(!validator.validate(&json!({"port": 0}), &schema).is_valid());

    let dangling = super_schema_with_dangling_ref();
    let result = validator.validate(&json!({"x": 1}), &dangling);
    assert!(result.issues.iter().any(|issue| issue.code == CODE_REF_UNRESOLVED));
}

/// Schema with an unresolvable reference.
fn super_schema_with_dangling_ref() -> Schema {
    serde_json::from_value(json!({
        "type": "object",
        "properties": { "x": { "$ref": "#/definitions/ghost" } }
    }))
    .unwrap()
}

/// Verifies string formats accept and reject.
#[test]
fn formats_are_strict_parses() {
    let validator = SchemaValidator::default();
    let cases = [
        ("date-time", "2026-03-01T12:30:00Z", "yesterday"),
        ("email", "ada@example.com", "not-an-email"),
        ("hostname", "api.example.com", "-bad-.example"),
        ("ipv4", "10.0.0.1", "10.0.0.256"),
        ("ipv6", "::1", "fffff::"),
        ("uri", "https://example.com/x", "no scheme here"),
        ("uuid", "6f61b5c2-9f5a-4f4e-8a54-2d3c3a6f7e21", "not-a-uuid"),
    ];
    for (format, good, bad) in cases {
        let schema = schema(json!({"type": "string", "format": format}));
        assert!(
            validator.validate(&json!(good), &schema).is_valid(),
            "{format} should accept {good}"
        );
        let result = validator.validate(&json!(bad), &schema);
        assert!(
            result.issues.iter().any(|issue| issue.code == CODE_FORMAT_INVALID),
            "{format} should reject {bad}"
        );
    }
}

/// Verifies the depth limit stops with one terminal issue.
#[test]
fn depth_limit_stops_the_walk() {
    let mut value = json!(1);
    for _ in 0..16 {
        value = json!({ "next": value });
    }
    let mut node = json!({"type": "integer"});
    for _ in 0..16 {
        node = json!({ "type": "object", "properties": { "next": node } });
    }
    let schema = schema(node);
    let validator = SchemaValidator::new(ValidatorConfig {
        max_depth: 10,
        max_errors: 100,
    });
    let result = validator.validate(&value, &schema);
    let terminal: Vec<_> =
        result.issues.iter().filter(|issue| issue.code == CODE_DEPTH_LIMIT).collect();
    assert_eq!(terminal.len(), 1);
}

/// Verifies the issue budget stops with one terminal issue.
#[test]
fn error_budget_stops_the_walk() {
    let items: Vec<serde_json::Value> = (0..50).map(|_| json!("wrong")).collect();
    let schema = schema(json!({"type": "array", "items": {"type": "integer"}}));
    let validator = SchemaValidator::new(ValidatorConfig {
        max_depth: 10,
        max_errors: 10,
    });
    let result = validator.validate(&json!(items), &schema);
    let terminal: Vec<_> =
        result.issues.iter().filter(|issue| issue.code == CODE_ERROR_LIMIT).collect();
    assert_eq!(terminal.len(), 1);
    assert!(result.issues.iter().filter(|issue| issue.code == CODE_TYPE_MISMATCH).count() <= 10);
}

/// Verifies batch validation isolates per-item outcomes.
#[test]
fn batch_validation_counts_outcomes() {
    let schema = schema(json!({"type": "integer"}));
    let validator = SchemaValidator::default();
    let report =
        validator.validate_batch(&[json!(1), json!("two"), json!(3)], &schema);
    assert_eq!(report.total, 3);
    assert_eq!(report.passed, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.outcomes[1].result.is_valid());
}
