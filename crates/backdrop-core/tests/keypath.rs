// crates/backdrop-core/tests/keypath.rs
// ============================================================================
// Module: Key Path Tests
// Description: Tests for key-path parsing and structural access.
// Purpose: Validate get/set/remove semantics and wildcard matching.
// Dependencies: backdrop-core
// ============================================================================
//! ## Overview
//! Ensures paths parse into the documented segments, set auto-creates the
//! right containers, remove never prunes parents, and wildcard matching is
//! a textual prefix check.

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

use backdrop_core::KeyPath;
use backdrop_core::StoreValue;
use backdrop_core::dependency_overlaps;
use backdrop_core::keypath;
use backdrop_core::matches_wildcard;

/// Verifies dotted and indexed paths parse into segments.
#[test]
fn parse_splits_segments_and_indices() {
    let segments = keypath::parse("cart.items[2][0].price").unwrap();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0].key, "cart");
    assert!(segments[0].indices.is_empty());
    assert_eq!(segments[1].key, "items");
    assert_eq!(segments[1].indices, vec![2, 0]);
    assert_eq!(segments[2].key, "price");
}

/// Verifies the root spellings parse as empty segment lists.
#[test]
fn parse_accepts_root_spellings() {
    assert!(keypath::parse("$").unwrap().is_empty());
    assert!(keypath::parse("").unwrap().is_empty());
}

/// Verifies malformed paths are rejected.
#[test]
fn parse_rejects_malformed_paths() {
    assert!(keypath::parse("a..b").is_err());
    assert!(keypath::parse("a[x]").is_err());
    assert!(keypath::parse("a[1").is_err());
    assert!(keypath::parse("items[*]").is_err());
}

/// Verifies set creates intermediate objects and get reads them back.
#[test]
fn set_then_get_roundtrips() {
    let mut root = StoreValue::empty_object();
    let path = KeyPath::new("user.profile.name");
    keypath::set(&mut root, &path, StoreValue::String("Ada".to_string())).unwrap();
    assert_eq!(
        keypath::get(&root, &path),
        Some(&StoreValue::String("Ada".to_string()))
    );
}

/// Verifies indexed set grows arrays with null padding.
#[test]
fn set_grows_arrays_for_indexed_segments() {
    let mut root = StoreValue::empty_object();
    keypath::set(&mut root, &KeyPath::new("users[1].score"), StoreValue::Integer(9)).unwrap();
    assert_eq!(
        keypath::get(&root, &KeyPath::new("users[0]")),
        Some(&StoreValue::Null)
    );
    assert_eq!(
        keypath::get(&root, &KeyPath::new("users[1].score")),
        Some(&StoreValue::Integer(9))
    );
}

/// Verifies get never creates intermediates.
#[test]
fn get_returns_none_for_missing_or_mismatched() {
    let mut root = StoreValue::empty_object();
    keypath::set(&mut root, &KeyPath::new("a.b"), StoreValue::Integer(1)).unwrap();
    assert!(keypath::get(&root, &KeyPath::new("a.c")).is_none());
    assert!(keypath::get(&root, &KeyPath::new("a.b.c")).is_none());
    assert!(keypath::get(&root, &KeyPath::new("a.b[0]")).is_none());
}

/// Verifies remove prunes the leaf key only and reports the old value.
#[test]
fn remove_prunes_leaf_and_keeps_parents() {
    let mut root = StoreValue::empty_object();
    keypath::set(&mut root, &KeyPath::new("a.b.c"), StoreValue::Bool(true)).unwrap();
    let old = keypath::remove(&mut root, &KeyPath::new("a.b.c"));
    assert_eq!(old, Some(StoreValue::Bool(true)));
    assert!(keypath::get(&root, &KeyPath::new("a.b.c")).is_none());
    assert_eq!(
        keypath::get(&root, &KeyPath::new("a.b")),
        Some(&StoreValue::empty_object())
    );
}

/// Verifies removing an absent path is a no-op returning None.
#[test]
fn remove_missing_path_is_noop() {
    let mut root = StoreValue::empty_object();
    assert!(keypath::remove(&mut root, &KeyPath::new("ghost.path")).is_none());
}

/// Verifies wildcard matching is a textual prefix check.
#[test]
fn wildcard_matches_by_prefix() {
    let dep = KeyPath::new("cart.items[*].price");
    assert!(matches_wildcard(&dep, &KeyPath::new("cart.items")));
    assert!(matches_wildcard(&dep, &KeyPath::new("cart.items[3].price")));
    assert!(!matches_wildcard(&dep, &KeyPath::new("cart.total")));
    assert!(!matches_wildcard(&KeyPath::new("cart.items"), &KeyPath::new("cart.items")));
}

/// Verifies concrete dependency overlap is a step-prefix relation.
#[test]
fn dependency_overlap_is_bidirectional_prefix() {
    assert!(dependency_overlaps(&KeyPath::new("a.b.c"), &KeyPath::new("a.b")));
    assert!(dependency_overlaps(&KeyPath::new("a.b"), &KeyPath::new("a.b.c")));
    assert!(!dependency_overlaps(&KeyPath::new("a.b"), &KeyPath::new("a.c")));
}
