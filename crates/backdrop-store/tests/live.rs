// crates/backdrop-store/tests/live.rs
// ============================================================================
// Module: Live Expression Tests
// Description: Tests for derived values, wildcards, and cycle refusal.
// Purpose: Validate evaluation triggers, change bundling, and acyclicity.
// Dependencies: backdrop-core, backdrop-store, backdrop-validation
// ============================================================================
//! ## Overview
//! Covers the derived-total and wildcard scenarios: expression writes join
//! the triggering change, wildcard dependencies re-evaluate per matching
//! write, chains fire within one logical cycle, and registration refuses
//! direct and transitive cycles.

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
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use backdrop_core::KeyPath;
use backdrop_core::Scope;
use backdrop_core::StoreValue;
use backdrop_core::ValueKind;
use backdrop_store::KeyValueStore;
use backdrop_store::LiveExpression;
use backdrop_store::LiveReader;
use backdrop_store::MemoryBackend;
use backdrop_store::StoreError;
use backdrop_validation::ValidationMode;
use backdrop_validation::ValidationOptions;
use backdrop_validation::ValidationRule;

/// Creates an app-scoped store over a fresh memory backend.
fn store() -> KeyValueStore {
    KeyValueStore::new(Scope::App, Arc::new(MemoryBackend::new())).unwrap()
}

/// Reads a numeric field from a cart item.
fn numeric(item: &StoreValue, field: &str) -> f64 {
    let StoreValue::Object(map) = item else {
        return 0.0;
    };
    match map.get(field) {
        Some(StoreValue::Number(value)) => *value,
        Some(StoreValue::Integer(value)) => *value as f64,
        _ => 0.0,
    }
}

/// Verifies the derived-total shape: rule, wildcard deps, bundled change.
#[test]
fn derived_cart_total_joins_the_triggering_change() {
    let store = store();
    let mut rule = ValidationRule::of_kind(ValueKind::Number);
    rule.min = Some(0.0);
    store
        .configure_validation(ValidationOptions {
            mode: ValidationMode::Strict,
            schema: [(KeyPath::new("cart.total"), rule)].into_iter().collect(),
        })
        .unwrap();

    store
        .register_live_expression(LiveExpression::new(
            "total",
            "cart.total",
            vec![KeyPath::new("cart.items[*].price"), KeyPath::new("cart.items[*].quantity")],
            |reader: &LiveReader<'_>| {
                let items = match reader.get_str("cart.items") {
                    Some(StoreValue::Array(items)) => items,
                    _ => return Some(StoreValue::Number(0.0)),
                };
                let total = items
                    .iter()
                    .map(|item| numeric(item, "price") * numeric(item, "quantity"))
                    .sum();
                Some(StoreValue::Number(total))
            },
        ))
        .unwrap();

    let mut changes = store.observe_changes().unwrap();
    let items = StoreValue::Array(vec![
        StoreValue::Object(
            [
                ("price".to_string(), StoreValue::Number(29.99)),
                ("quantity".to_string(), StoreValue::Integer(1)),
            ]
            .into_iter()
            .collect(),
        ),
        StoreValue::Object(
            [
                ("price".to_string(), StoreValue::Number(15.50)),
                ("quantity".to_string(), StoreValue::Integer(2)),
            ]
            .into_iter()
            .collect(),
        ),
    ]);
    store.set("cart.items", items).unwrap();

    let Some(StoreValue::Number(total)) = store.get("cart.total").unwrap() else {
        panic!("expected a numeric total");
    };
    assert!((total - 60.99).abs() < 1e-9);

    let change = changes.try_next().unwrap();
    let paths: Vec<&str> =
        change.patches.iter().map(|patch| patch.key_path.as_str()).collect();
    assert_eq!(paths, vec!["cart.items", "cart.total"]);

    assert_eq!(
        store.get("cart.items[0].quantity").unwrap(),
        Some(StoreValue::Integer(1))
    );
    assert_eq!(
        store.get("cart.items[0].price").unwrap(),
        Some(StoreValue::Number(29.99))
    );
}

/// Verifies the wildcard shape: two writes, two re-evaluations.
#[test]
fn wildcard_dependency_reevaluates_per_matching_write() {
    let store = store();
    let evaluations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evaluations);

    store
        .register_live_expression(LiveExpression::new(
            "top-score",
            "users.topScore",
            vec![KeyPath::new("users[*].score")],
            move |reader: &LiveReader<'_>| {
                counter.fetch_add(1, Ordering::SeqCst);
                let items = match reader.get_str("users") {
                    Some(StoreValue::Array(items)) => items,
                    _ => return None,
                };
                items
                    .iter()
                    .filter_map(|item| match item {
                        StoreValue::Object(map) => match map.get("score") {
                            Some(StoreValue::Integer(score)) => Some(*score),
                            _ => None,
                        },
                        _ => None,
                    })
                    .max()
                    .map(StoreValue::Integer)
            },
        ))
        .unwrap();
    // Registration evaluates once with no users present.
    assert_eq!(evaluations.load(Ordering::SeqCst), 1);

    store.set("users[0].score", StoreValue::Integer(5)).unwrap();
    store.set("users[1].score", StoreValue::Integer(9)).unwrap();

    assert_eq!(store.get("users.topScore").unwrap(), Some(StoreValue::Integer(9)));
    // Exactly two re-evaluations beyond the registration pass.
    assert_eq!(evaluations.load(Ordering::SeqCst), 3);
}

/// Verifies chained expressions settle within one change.
#[test]
fn chained_expressions_fire_in_one_cycle() {
    let store = store();
    store
        .register_live_expression(LiveExpression::new(
            "doubled",
            "derived.double",
            vec![KeyPath::new("input")],
            |reader: &LiveReader<'_>| match reader.get_str("input") {
                Some(StoreValue::Integer(value)) => Some(StoreValue::Integer(value * 2)),
                _ => None,
            },
        ))
        .unwrap();
    store
        .register_live_expression(LiveExpression::new(
            "quadrupled",
            "derived.quad",
            vec![KeyPath::new("derived.double")],
            |reader: &LiveReader<'_>| match reader.get_str("derived.double") {
                Some(StoreValue::Integer(value)) => Some(StoreValue::Integer(value * 2)),
                _ => None,
            },
        ))
        .unwrap();

    let mut changes = store.observe_changes().unwrap();
    store.set("input", StoreValue::Integer(3)).unwrap();

    let change = changes.try_next().unwrap();
    assert_eq!(change.patches.len(), 3);
    assert_eq!(store.get("derived.quad").unwrap(), Some(StoreValue::Integer(12)));
    assert!(changes.try_next().is_none());
}

/// Verifies unrelated writes do not re-evaluate the expression.
#[test]
fn unrelated_writes_do_not_trigger() {
    let store = store();
    let evaluations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evaluations);
    store
        .register_live_expression(LiveExpression::new(
            "watcher",
            "derived.out",
            vec![KeyPath::new("watched.value")],
            move |_: &LiveReader<'_>| {
                counter.fetch_add(1, Ordering::SeqCst);
                None
            },
        ))
        .unwrap();

    store.set("elsewhere", StoreValue::Integer(1)).unwrap();
    store.set("watched2", StoreValue::Integer(2)).unwrap();
    assert_eq!(evaluations.load(Ordering::SeqCst), 1);
}

/// Verifies direct self-dependency is refused.
#[test]
fn direct_cycle_is_refused() {
    let store = store();
    let outcome = store.register_live_expression(LiveExpression::new(
        "echo",
        "value",
        vec![KeyPath::new("value")],
        |_: &LiveReader<'_>| None,
    ));
    assert!(matches!(outcome, Err(StoreError::CycleDetected(id)) if id == "echo"));
}

/// Verifies transitive cycles are refused at registration time.
#[test]
fn transitive_cycle_is_refused() {
    let store = store();
    store
        .register_live_expression(LiveExpression::new(
            "a-to-b",
            "b",
            vec![KeyPath::new("a")],
            |_: &LiveReader<'_>| None,
        ))
        .unwrap();
    store
        .register_live_expression(LiveExpression::new(
            "b-to-c",
            "c",
            vec![KeyPath::new("b")],
            |_: &LiveReader<'_>| None,
        ))
        .unwrap();

    let outcome = store.register_live_expression(LiveExpression::new(
        "c-to-a",
        "a",
        vec![KeyPath::new("c")],
        |_: &LiveReader<'_>| None,
    ));
    assert!(matches!(outcome, Err(StoreError::CycleDetected(id)) if id == "c-to-a"));
}

/// Verifies unregistered expressions stop firing.
#[test]
fn unregistered_expressions_stop_firing() {
    let store = store();
    let evaluations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evaluations);
    store
        .register_live_expression(LiveExpression::new(
            "watcher",
            "derived.out",
            vec![KeyPath::new("watched")],
            move |_: &LiveReader<'_>| {
                counter.fetch_add(1, Ordering::SeqCst);
                None
            },
        ))
        .unwrap();
    store.unregister_live_expression("watcher").unwrap();
    store.set("watched", StoreValue::Integer(1)).unwrap();
    assert_eq!(evaluations.load(Ordering::SeqCst), 1);
}
