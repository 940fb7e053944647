// crates/backdrop-core/src/core/keypath.rs
// ============================================================================
// Module: Backdrop Key Paths
// Description: Dotted, indexed path addressing over store value trees.
// Purpose: Provide parse and structural get/set/remove for store mutation.
// Dependencies: crate::core::value, serde, thiserror
// ============================================================================

//! ## Overview
//! A key path is a dotted string of segments; a segment may be suffixed by
//! one or more `[n]` indices for array access. The root is written `$` (or
//! the empty string). `[*]` is a wildcard accepted only in live-expression
//! dependency declarations and is matched textually, never traversed.
//!
//! `set` auto-creates intermediate objects (and arrays, when the first
//! missing step is an index); `get` never creates; `remove` prunes only the
//! leaf and leaves empty parents in place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::value::StoreValue;

// ============================================================================
// SECTION: Key Path Type
// ============================================================================

/// Dotted key path addressing a location in a store value tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPath(String);

impl KeyPath {
    /// Creates a key path from its string form.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the root path (`$`).
    #[must_use]
    pub fn root() -> Self {
        Self("$".to_string())
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the path addresses the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty() || self.0 == "$"
    }

    /// Returns true when the path contains the `[*]` dependency wildcard.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.0.contains("[*]")
    }

    /// Parses the path into segments.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPathError`] when a segment is empty, an index is
    /// malformed, or the path contains a wildcard (wildcards are legal only
    /// in dependency declarations).
    pub fn segments(&self) -> Result<Vec<Segment>, KeyPathError> {
        parse(&self.0)
    }

    /// Flattens the path into traversal steps.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPathError`] when the path does not parse.
    pub fn steps(&self) -> Result<Vec<Step>, KeyPathError> {
        let mut steps = Vec::new();
        for segment in self.segments()? {
            steps.push(Step::Key(segment.key));
            for index in segment.indices {
                steps.push(Step::Index(index));
            }
        }
        Ok(steps)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for KeyPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for KeyPath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Segments and Steps
// ============================================================================

/// Parsed path segment: a key with zero or more trailing indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Object key for the segment.
    pub key: String,
    /// Array indices applied after the key, in order.
    pub indices: Vec<usize>,
}

/// Single traversal step over a value tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Descend into an object by key.
    Key(String),
    /// Descend into an array by index.
    Index(usize),
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Key path parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyPathError {
    /// A dotted segment is empty.
    #[error("empty segment in key path: {0}")]
    EmptySegment(String),
    /// An index suffix is not a non-negative integer.
    #[error("malformed index in key path segment: {0}")]
    MalformedIndex(String),
    /// An index bracket is not closed.
    #[error("unterminated index bracket in key path: {0}")]
    UnterminatedIndex(String),
    /// A wildcard appears in a concrete path.
    #[error("wildcard [*] is not addressable: {0}")]
    WildcardNotAddressable(String),
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a path string into segments.
///
/// # Errors
///
/// Returns [`KeyPathError`] on empty segments, malformed indices, or
/// wildcards.
pub fn parse(path: &str) -> Result<Vec<Segment>, KeyPathError> {
    if path.is_empty() || path == "$" {
        return Ok(Vec::new());
    }
    let mut segments = Vec::new();
    for raw in path.split('.') {
        if raw.is_empty() {
            return Err(KeyPathError::EmptySegment(path.to_string()));
        }
        segments.push(parse_segment(raw, path)?);
    }
    Ok(segments)
}

/// Parses one dotted segment, splitting off `[n]` index suffixes.
fn parse_segment(raw: &str, path: &str) -> Result<Segment, KeyPathError> {
    let Some(bracket) = raw.find('[') else {
        return Ok(Segment {
            key: raw.to_string(),
            indices: Vec::new(),
        });
    };
    let key = &raw[..bracket];
    if key.is_empty() {
        return Err(KeyPathError::EmptySegment(path.to_string()));
    }
    let mut indices = Vec::new();
    let mut rest = &raw[bracket..];
    while !rest.is_empty() {
        let Some(stripped) = rest.strip_prefix('[') else {
            return Err(KeyPathError::MalformedIndex(path.to_string()));
        };
        let Some(close) = stripped.find(']') else {
            return Err(KeyPathError::UnterminatedIndex(path.to_string()));
        };
        let digits = &stripped[..close];
        if digits == "*" {
            return Err(KeyPathError::WildcardNotAddressable(path.to_string()));
        }
        let index =
            digits.parse::<usize>().map_err(|_| KeyPathError::MalformedIndex(path.to_string()))?;
        indices.push(index);
        rest = &stripped[close + 1..];
    }
    Ok(Segment {
        key: key.to_string(),
        indices,
    })
}

// ============================================================================
// SECTION: Structural Access
// ============================================================================

/// Reads the value at a path, without creating intermediates.
///
/// Returns `None` when any intermediate is absent or of the wrong kind, or
/// when the path does not parse.
#[must_use]
pub fn get<'tree>(root: &'tree StoreValue, path: &KeyPath) -> Option<&'tree StoreValue> {
    let steps = path.steps().ok()?;
    let mut node = root;
    for step in &steps {
        node = match (step, node) {
            (Step::Key(key), StoreValue::Object(map)) => map.get(key)?,
            (Step::Index(index), StoreValue::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Writes a value at a path, creating intermediate containers as needed.
///
/// Intermediate objects are created for key steps; arrays are created only
/// when the first missing step is an index. Arrays grow with `null` padding
/// up to the target index. Returns the previous value at the path, if any.
///
/// # Errors
///
/// Returns [`KeyPathError`] when the path does not parse.
pub fn set(
    root: &mut StoreValue,
    path: &KeyPath,
    value: StoreValue,
) -> Result<Option<StoreValue>, KeyPathError> {
    let steps = path.steps()?;
    if steps.is_empty() {
        let old = std::mem::replace(root, value);
        return Ok(Some(old));
    }
    Ok(set_steps(root, &steps, value))
}

/// Recursive step-wise descent for [`set`].
fn set_steps(node: &mut StoreValue, steps: &[Step], value: StoreValue) -> Option<StoreValue> {
    let Some((first, rest)) = steps.split_first() else {
        let old = std::mem::replace(node, value);
        return match old {
            StoreValue::Null => None,
            other => Some(other),
        };
    };
    match first {
        Step::Key(key) => {
            if !matches!(node, StoreValue::Object(_)) {
                *node = StoreValue::empty_object();
            }
            match node {
                StoreValue::Object(map) => {
                    let child = map.entry(key.clone()).or_insert_with(|| placeholder(rest));
                    set_steps(child, rest, value)
                }
                _ => None,
            }
        }
        Step::Index(index) => {
            if !matches!(node, StoreValue::Array(_)) {
                *node = StoreValue::Array(Vec::new());
            }
            match node {
                StoreValue::Array(items) => {
                    while items.len() <= *index {
                        items.push(placeholder_for_missing(items.len(), *index, rest));
                    }
                    items.get_mut(*index).and_then(|child| set_steps(child, rest, value))
                }
                _ => None,
            }
        }
    }
}

/// Container seeded for a newly created child, based on the next step.
fn placeholder(rest: &[Step]) -> StoreValue {
    match rest.first() {
        Some(Step::Index(_)) => StoreValue::Array(Vec::new()),
        Some(Step::Key(_)) => StoreValue::empty_object(),
        None => StoreValue::Null,
    }
}

/// Padding value while growing an array toward the target index.
fn placeholder_for_missing(position: usize, target: usize, rest: &[Step]) -> StoreValue {
    if position == target {
        placeholder(rest)
    } else {
        StoreValue::Null
    }
}

/// Removes the value at a path.
///
/// Object leaf keys are pruned; array leaf elements are replaced by `null`
/// so sibling indices stay stable. Empty parents are never pruned. Removing
/// an absent path is a no-op returning `None`.
#[must_use]
pub fn remove(root: &mut StoreValue, path: &KeyPath) -> Option<StoreValue> {
    let steps = path.steps().ok()?;
    let Some((leaf, parents)) = steps.split_last() else {
        let old = std::mem::replace(root, StoreValue::empty_object());
        return match old {
            StoreValue::Null => None,
            other => Some(other),
        };
    };
    let mut node = root;
    for step in parents {
        node = match (step, node) {
            (Step::Key(key), StoreValue::Object(map)) => map.get_mut(key)?,
            (Step::Index(index), StoreValue::Array(items)) => items.get_mut(*index)?,
            _ => return None,
        };
    }
    match (leaf, node) {
        (Step::Key(key), StoreValue::Object(map)) => map.remove(key),
        (Step::Index(index), StoreValue::Array(items)) => {
            let slot = items.get_mut(*index)?;
            match std::mem::replace(slot, StoreValue::Null) {
                StoreValue::Null => None,
                other => Some(other),
            }
        }
        _ => None,
    }
}

// ============================================================================
// SECTION: Dependency Matching
// ============================================================================

/// Matches a wildcard dependency against a concrete path.
///
/// Returns true only when `dep` contains `[*]` and `path` starts with the
/// textual prefix before the wildcard.
#[must_use]
pub fn matches_wildcard(dep: &KeyPath, path: &KeyPath) -> bool {
    let Some(cut) = dep.as_str().find("[*]") else {
        return false;
    };
    path.as_str().starts_with(&dep.as_str()[..cut])
}

/// Returns true when a dependency declaration is affected by a patched path.
///
/// Wildcard dependencies match by textual prefix. Concrete dependencies
/// match when either path is a step-prefix of the other, so replacing an
/// ancestor container triggers dependents on its children and vice versa.
#[must_use]
pub fn dependency_overlaps(dep: &KeyPath, path: &KeyPath) -> bool {
    if dep.has_wildcard() {
        return matches_wildcard(dep, path);
    }
    let (Ok(dep_steps), Ok(path_steps)) = (dep.steps(), path.steps()) else {
        return false;
    };
    let shorter = dep_steps.len().min(path_steps.len());
    dep_steps[..shorter] == path_steps[..shorter]
}
