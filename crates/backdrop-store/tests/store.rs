// crates/backdrop-store/tests/store.rs
// ============================================================================
// Module: Key-Value Store Tests
// Description: Tests for mutations, observation, and validation gating.
// Purpose: Validate patch emission, observer delivery, and write decisions.
// Dependencies: backdrop-core, backdrop-store, backdrop-validation
// ============================================================================
//! ## Overview
//! Exercises the store's mutation surface: patches carry pre-state, change
//! events arrive in order, per-path and per-set observers deliver eagerly
//! then per change, strict validation rejects, and lenient validation
//! follows the coercion ladder.

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

use std::sync::Arc;

use backdrop_core::KeyPath;
use backdrop_core::PatchOp;
use backdrop_core::Scope;
use backdrop_core::StoreValue;
use backdrop_core::ValueKind;
use backdrop_store::KeyValueStore;
use backdrop_store::MemoryBackend;
use backdrop_store::StoreError;
use backdrop_validation::ValidationMode;
use backdrop_validation::ValidationOptions;
use backdrop_validation::ValidationRule;

/// Creates an app-scoped store over a fresh memory backend.
fn store() -> KeyValueStore {
    KeyValueStore::new(Scope::App, Arc::new(MemoryBackend::new())).unwrap()
}

/// Verifies set emits one patch carrying the pre-state.
#[test]
fn set_emits_patch_with_old_value() {
    let store = store();
    let mut changes = store.observe_changes().unwrap();

    store.set("greeting", StoreValue::String("hi".to_string())).unwrap();
    store.set("greeting", StoreValue::String("hello".to_string())).unwrap();

    let first = changes.try_next().unwrap();
    assert_eq!(first.patches.len(), 1);
    assert_eq!(first.patches[0].op, PatchOp::Set);
    assert!(first.patches[0].old_value.is_none());

    let second = changes.try_next().unwrap();
    assert_eq!(second.patches[0].old_value, Some(StoreValue::String("hi".to_string())));
    assert_eq!(second.patches[0].new_value, Some(StoreValue::String("hello".to_string())));
    assert!(second.transaction_id.is_none());
}

/// Verifies merge overwrites keys shallowly and replaces non-objects.
#[test]
fn merge_overwrites_shallowly() {
    let store = store();
    let mut changes = store.observe_changes().unwrap();

    store
        .merge(
            "profile",
            StoreValue::Object(
                [("name".to_string(), StoreValue::String("Ada".to_string()))].into_iter().collect(),
            ),
        )
        .unwrap();
    // The path was absent, so the first merge lands as a set.
    assert_eq!(changes.try_next().unwrap().patches[0].op, PatchOp::Set);

    store
        .merge(
            "profile",
            StoreValue::Object(
                [("age".to_string(), StoreValue::Integer(36))].into_iter().collect(),
            ),
        )
        .unwrap();
    assert_eq!(changes.try_next().unwrap().patches[0].op, PatchOp::Merge);

    assert_eq!(
        store.get("profile.name").unwrap(),
        Some(StoreValue::String("Ada".to_string()))
    );
    assert_eq!(store.get("profile.age").unwrap(), Some(StoreValue::Integer(36)));

    assert!(matches!(
        store.merge("profile", StoreValue::Integer(1)),
        Err(StoreError::InvalidValueType { expected: ValueKind::Object, .. })
    ));
}

/// Verifies removing an absent path still reaches the change stream.
#[test]
fn remove_absent_path_emits_empty_patch() {
    let store = store();
    let mut changes = store.observe_changes().unwrap();
    let mut values = store.observe("ghost").unwrap();
    assert_eq!(values.try_next(), Some(None));

    store.remove("ghost").unwrap();

    let change = changes.try_next().unwrap();
    assert_eq!(change.patches[0].op, PatchOp::Remove);
    assert!(change.patches[0].old_value.is_none());
    assert!(change.patches[0].new_value.is_none());
    // The value did not change, so the per-path observer stays quiet.
    assert!(values.try_next().is_none());
}

/// Verifies per-path observation delivers the current value eagerly.
#[test]
fn observe_delivers_current_then_updates() {
    let store = store();
    store.set("counter", StoreValue::Integer(1)).unwrap();

    let mut observer = store.observe("counter").unwrap();
    assert_eq!(observer.try_next(), Some(Some(StoreValue::Integer(1))));

    store.set("counter", StoreValue::Integer(2)).unwrap();
    assert_eq!(observer.try_next(), Some(Some(StoreValue::Integer(2))));

    store.remove("counter").unwrap();
    assert_eq!(observer.try_next(), Some(None));
}

/// Verifies ancestor writes notify descendant observers.
#[test]
fn observe_fires_on_ancestor_replacement() {
    let store = store();
    store.set("user.name", StoreValue::String("Ada".to_string())).unwrap();
    let mut observer = store.observe("user.name").unwrap();
    let _ = observer.try_next();

    store
        .set(
            "user",
            StoreValue::Object(
                [("name".to_string(), StoreValue::String("Grace".to_string()))]
                    .into_iter()
                    .collect(),
            ),
        )
        .unwrap();
    assert_eq!(observer.try_next(), Some(Some(StoreValue::String("Grace".to_string()))));
}

/// Verifies observe_many emits an eager object and batches per change.
#[test]
fn observe_many_batches_watched_paths() {
    let store = store();
    store.set("a", StoreValue::Integer(1)).unwrap();

    let mut observer = store
        .observe_many(vec![KeyPath::new("a"), KeyPath::new("b")])
        .unwrap();
    let initial = observer.try_next().unwrap();
    let StoreValue::Object(map) = initial else {
        panic!("expected an object batch");
    };
    assert_eq!(map.get("a"), Some(&StoreValue::Integer(1)));
    assert_eq!(map.get("b"), Some(&StoreValue::Null));

    store.set("b", StoreValue::Bool(true)).unwrap();
    let StoreValue::Object(map) = observer.try_next().unwrap() else {
        panic!("expected an object batch");
    };
    assert_eq!(map.get("b"), Some(&StoreValue::Bool(true)));

    store.set("unrelated", StoreValue::Integer(9)).unwrap();
    assert!(observer.try_next().is_none());
}

/// Verifies wildcard paths in observe_many match indexed writes.
#[test]
fn observe_many_honors_wildcards() {
    let store = store();
    let mut observer = store.observe_many(vec![KeyPath::new("items[*].price")]).unwrap();
    let _ = observer.try_next();

    store.set("items[0].price", StoreValue::Number(9.5)).unwrap();
    let StoreValue::Object(map) = observer.try_next().unwrap() else {
        panic!("expected an object batch");
    };
    // The wildcard entry exposes the container under the prefix.
    assert!(map.contains_key("items[*].price"));

    store.set("totals", StoreValue::Integer(1)).unwrap();
    assert!(observer.try_next().is_none());
}

/// Verifies snapshot plus replace_all is a logical no-op.
#[test]
fn replace_all_of_snapshot_is_a_noop() {
    let store = store();
    store.set("a.b", StoreValue::Integer(1)).unwrap();
    store.set("c", StoreValue::String("x".to_string())).unwrap();

    let before = store.snapshot().unwrap();
    let root = StoreValue::Object(
        before.iter().map(|(path, value)| (path.as_str().to_string(), value.clone())).collect(),
    );

    let mut changes = store.observe_changes().unwrap();
    store.replace_all(root).unwrap();

    // One coarse patch at the root reaches the store-level stream.
    let change = changes.try_next().unwrap();
    assert_eq!(change.patches.len(), 1);
    assert!(change.patches[0].key_path.is_root());
    assert_eq!(store.snapshot().unwrap(), before);
}

/// Verifies strict mode surfaces a typed validation failure.
#[test]
fn strict_validation_rejects_and_preserves_state() {
    let store = store();
    let mut rule = ValidationRule::of_kind(ValueKind::Integer);
    rule.min = Some(1.0);
    store
        .configure_validation(ValidationOptions {
            mode: ValidationMode::Strict,
            schema: [(KeyPath::new("port"), rule)].into_iter().collect(),
        })
        .unwrap();

    store.set("port", StoreValue::Integer(443)).unwrap();
    assert!(matches!(
        store.set("port", StoreValue::String("nope".to_string())),
        Err(StoreError::Validation(_))
    ));
    assert_eq!(store.get("port").unwrap(), Some(StoreValue::Integer(443)));
}

/// Verifies the S4 shape: lenient coercion writes the coerced integer.
#[test]
fn lenient_validation_coerces_string_port() {
    let store = store();
    let mut rule = ValidationRule::of_kind(ValueKind::Integer);
    rule.min = Some(1.0);
    rule.max = Some(65535.0);
    store
        .configure_validation(ValidationOptions {
            mode: ValidationMode::Lenient,
            schema: [(KeyPath::new("port"), rule)].into_iter().collect(),
        })
        .unwrap();

    let mut changes = store.observe_changes().unwrap();
    store.set("port", StoreValue::String("8080".to_string())).unwrap();

    assert_eq!(store.get("port").unwrap(), Some(StoreValue::Integer(8080)));
    let change = changes.try_next().unwrap();
    assert_eq!(change.patches.len(), 1);
    assert_eq!(change.patches[0].new_value, Some(StoreValue::Integer(8080)));
}

/// Verifies typed reads and their failure kinds.
#[test]
fn typed_reads_fail_closed() {
    let store = store();
    store.set("flag", StoreValue::Bool(true)).unwrap();

    let flag: bool = store.get_typed("flag").unwrap();
    assert!(flag);
    assert!(store.exists("flag").unwrap());
    assert!(!store.exists("missing").unwrap());

    assert!(matches!(
        store.get_typed::<i64>("missing"),
        Err(StoreError::NotFound(path)) if path.as_str() == "missing"
    ));
    assert!(matches!(store.get_typed::<i64>("flag"), Err(StoreError::Decode { .. })));
}
