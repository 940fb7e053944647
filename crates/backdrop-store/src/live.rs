// crates/backdrop-store/src/live.rs
// ============================================================================
// Module: Backdrop Live Expressions
// Description: Declarative derived values recomputed on dependency changes.
// Purpose: Maintain the expression registry with acyclicity enforcement.
// Dependencies: backdrop-core
// ============================================================================

//! ## Overview
//! A live expression derives a value from declared dependencies and writes it
//! at its output path whenever a dependency changes. Dependencies may use the
//! `[*]` wildcard to match any index under a prefix. The registry refuses an
//! expression whose dependency graph would reach its own output, directly or
//! transitively: the edge relation is "A's output feeds one of B's
//! dependencies", and registration runs a depth-first search over it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use backdrop_core::KeyPath;
use backdrop_core::StoreValue;
use backdrop_core::dependency_overlaps;
use backdrop_core::keypath;

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Read-only view handed to expression compute functions.
///
/// Reads go against the store root as of the evaluation point, inside the
/// store's serialization point; compute functions must not call back into
/// the store.
pub struct LiveReader<'tree> {
    /// Root the expression reads from.
    root: &'tree StoreValue,
}

impl<'tree> LiveReader<'tree> {
    /// Creates a reader over a root.
    #[must_use]
    pub const fn new(root: &'tree StoreValue) -> Self {
        Self {
            root,
        }
    }

    /// Reads the value at a path.
    #[must_use]
    pub fn get(&self, path: &KeyPath) -> Option<StoreValue> {
        keypath::get(self.root, path).cloned()
    }

    /// Reads the value at a path given as text.
    #[must_use]
    pub fn get_str(&self, path: &str) -> Option<StoreValue> {
        self.get(&KeyPath::new(path))
    }
}

// ============================================================================
// SECTION: Expressions
// ============================================================================

/// Compute function of a live expression.
pub type ComputeFn = Arc<dyn Fn(&LiveReader<'_>) -> Option<StoreValue> + Send + Sync>;

/// Write policy applied to expression outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Write only when the computed value differs from the stored one.
    #[default]
    WriteIfChanged,
    /// Write on every evaluation.
    AlwaysWrite,
}

/// Registered live expression.
#[derive(Clone)]
pub struct LiveExpression {
    /// Registry identifier.
    pub id: String,
    /// Path the computed value is written to.
    pub output_key_path: KeyPath,
    /// Dependency declarations; `[*]` wildcards allowed.
    pub depends_on: Vec<KeyPath>,
    /// Output write policy.
    pub policy: WritePolicy,
    /// Compute function.
    pub compute: ComputeFn,
}

impl LiveExpression {
    /// Creates an expression with the default write policy.
    pub fn new(
        id: impl Into<String>,
        output_key_path: impl Into<KeyPath>,
        depends_on: Vec<KeyPath>,
        compute: impl Fn(&LiveReader<'_>) -> Option<StoreValue> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            output_key_path: output_key_path.into(),
            depends_on,
            policy: WritePolicy::default(),
            compute: Arc::new(compute),
        }
    }

    /// Sets the write policy.
    #[must_use]
    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// True when any of the given patched paths feeds a dependency.
    #[must_use]
    pub fn triggered_by(&self, patched: &[KeyPath]) -> bool {
        self.depends_on
            .iter()
            .any(|dep| patched.iter().any(|path| dependency_overlaps(dep, path)))
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Expression registry with acyclicity enforcement.
#[derive(Default, Clone)]
pub struct ExpressionRegistry {
    /// Expressions keyed by id.
    expressions: BTreeMap<String, LiveExpression>,
}

impl ExpressionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an expression after the cycle check.
    ///
    /// Returns the rejected expression id on failure so the store can raise
    /// its cycle error.
    ///
    /// # Errors
    ///
    /// Fails when the expression's dependency graph would include its own
    /// output, directly or transitively.
    pub fn register(&mut self, expression: LiveExpression) -> Result<(), String> {
        if self.would_cycle(&expression) {
            return Err(expression.id);
        }
        self.expressions.insert(expression.id.clone(), expression);
        Ok(())
    }

    /// Removes an expression by id.
    pub fn unregister(&mut self, id: &str) -> Option<LiveExpression> {
        self.expressions.remove(id)
    }

    /// Returns the registered expression count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    /// True when no expressions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Expressions triggered by the given patched paths, in id order.
    #[must_use]
    pub fn triggered_by(&self, patched: &[KeyPath]) -> Vec<LiveExpression> {
        self.expressions
            .values()
            .filter(|expression| expression.triggered_by(patched))
            .cloned()
            .collect()
    }

    /// Depth-first search for a cycle through the candidate.
    ///
    /// Edges run from an expression to every expression whose dependencies
    /// its output feeds. The candidate cycles when the walk starting at its
    /// output reaches the candidate again.
    fn would_cycle(&self, candidate: &LiveExpression) -> bool {
        // Direct self-dependency.
        if candidate.triggered_by(std::slice::from_ref(&candidate.output_key_path)) {
            return true;
        }
        let mut stack = vec![candidate.output_key_path.clone()];
        let mut visited: Vec<String> = Vec::new();
        while let Some(output) = stack.pop() {
            for expression in self.expressions.values() {
                if !expression.triggered_by(std::slice::from_ref(&output)) {
                    continue;
                }
                if expression
                    .output_key_path
                    .as_str()
                    .eq(candidate.output_key_path.as_str())
                    || candidate.triggered_by(std::slice::from_ref(&expression.output_key_path))
                {
                    return true;
                }
                if !visited.contains(&expression.id) {
                    visited.push(expression.id.clone());
                    stack.push(expression.output_key_path.clone());
                }
            }
        }
        false
    }
}
