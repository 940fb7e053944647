// crates/backdrop-runtime/src/resolver.rs
// ============================================================================
// Module: Backdrop Value Resolver
// Description: Resolves value descriptors and evaluates conditions.
// Purpose: Turn declarative descriptors into concrete store values at
//          execution time.
// Dependencies: backdrop-core, backdrop-store, serde_json
// ============================================================================

//! ## Overview
//! Descriptors resolve against an [`EventContext`]: literals decode against
//! their declared kind, store reads go through the manager, computed
//! expressions combine two resolved operands (or substitute any number into
//! a template), and event-data lookups walk the triggering payload. Missing
//! or non-comparable data fails closed: ordering comparisons over
//! non-numeric operands are `false`, never errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use backdrop_core::ComputedOp;
use backdrop_core::ConditionDescriptor;
use backdrop_core::KeyPath;
use backdrop_core::ScenarioId;
use backdrop_core::Step;
use backdrop_core::StoreValue;
use backdrop_core::ValueDecodeError;
use backdrop_core::ValueDescriptor;
use backdrop_store::StoreError;
use backdrop_store::StoreManager;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Event Context
// ============================================================================

/// Context a descriptor resolves against.
#[derive(Debug, Clone)]
pub struct EventContext {
    /// Scenario owning the execution.
    pub scenario_id: ScenarioId,
    /// Payload of the triggering event, if any.
    pub event_data: Option<Value>,
}

impl EventContext {
    /// Creates a context with no event payload.
    #[must_use]
    pub const fn new(scenario_id: ScenarioId) -> Self {
        Self {
            scenario_id,
            event_data: None,
        }
    }

    /// Creates a context carrying an event payload.
    #[must_use]
    pub const fn with_event(scenario_id: ScenarioId, event_data: Value) -> Self {
        Self {
            scenario_id,
            event_data: Some(event_data),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Descriptor resolution errors.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Descriptor is ill-formed (operand counts, missing template).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// Literal payload failed to decode.
    #[error(transparent)]
    Decode(#[from] ValueDecodeError),
    /// Store read failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves descriptors against stores and event payloads.
#[derive(Clone)]
pub struct ValueResolver {
    /// Store manager used for store-backed descriptors.
    stores: Arc<StoreManager>,
}

impl ValueResolver {
    /// Creates a resolver over a store manager.
    #[must_use]
    pub const fn new(stores: Arc<StoreManager>) -> Self {
        Self {
            stores,
        }
    }

    /// Resolves a value descriptor to a concrete value.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Decode`] for malformed literals,
    /// [`ResolveError::Store`] for failed store reads, and
    /// [`ResolveError::InvalidOperation`] for ill-formed computed
    /// descriptors.
    pub fn resolve_value(
        &self,
        descriptor: &ValueDescriptor,
        ctx: &EventContext,
    ) -> Result<StoreValue, ResolveError> {
        match descriptor {
            ValueDescriptor::Literal {
                kind,
                value,
            } => Ok(StoreValue::decode(*kind, value)?),
            ValueDescriptor::StoreValue {
                store_ref,
                key_path,
                default_value,
            } => {
                let key = store_ref.resolve(&ctx.scenario_id);
                let store = self.stores.get_store(key.scope, key.storage)?;
                Ok(store
                    .get(key_path.clone())?
                    .or_else(|| default_value.clone())
                    .unwrap_or(StoreValue::Null))
            }
            ValueDescriptor::Computed {
                op,
                operands,
                template,
            } => self.resolve_computed(*op, operands, template.as_deref(), ctx),
            ValueDescriptor::EventData {
                path,
            } => Ok(lookup_event_data(ctx.event_data.as_ref(), path)),
        }
    }

    /// Resolves a computed descriptor.
    fn resolve_computed(
        &self,
        op: ComputedOp,
        operands: &[ValueDescriptor],
        template: Option<&str>,
        ctx: &EventContext,
    ) -> Result<StoreValue, ResolveError> {
        if op == ComputedOp::Template {
            let Some(template) = template else {
                return Err(ResolveError::InvalidOperation(
                    "computed template without a template string".to_string(),
                ));
            };
            let mut rendered = template.to_string();
            for (index, operand) in operands.iter().enumerate() {
                let value = self.resolve_value(operand, ctx)?;
                rendered = rendered.replace(&format!("{{{index}}}"), &value.stringify());
            }
            return Ok(StoreValue::String(rendered));
        }

        let [left, right] = operands else {
            return Err(ResolveError::InvalidOperation(format!(
                "computed {op:?} requires exactly two operands, got {}",
                operands.len()
            )));
        };
        let left = self.resolve_value(left, ctx)?;
        let right = self.resolve_value(right, ctx)?;
        apply_arithmetic(op, &left, &right)
    }

    /// Evaluates a condition descriptor.
    ///
    /// # Errors
    ///
    /// Propagates operand resolution failures; `not` without a nested
    /// condition is [`ResolveError::InvalidOperation`].
    pub fn evaluate_condition(
        &self,
        condition: &ConditionDescriptor,
        ctx: &EventContext,
    ) -> Result<bool, ResolveError> {
        match condition {
            ConditionDescriptor::Equals {
                left,
                right,
            } => Ok(self.resolve_value(left, ctx)?.deep_equal(&self.resolve_value(right, ctx)?)),
            ConditionDescriptor::NotEquals {
                left,
                right,
            } => Ok(!self.resolve_value(left, ctx)?.deep_equal(&self.resolve_value(right, ctx)?)),
            ConditionDescriptor::GreaterThan {
                left,
                right,
            } => self.compare(left, right, ctx, |ordering| ordering > 0.0),
            ConditionDescriptor::GreaterThanOrEqual {
                left,
                right,
            } => self.compare(left, right, ctx, |ordering| ordering >= 0.0),
            ConditionDescriptor::LessThan {
                left,
                right,
            } => self.compare(left, right, ctx, |ordering| ordering < 0.0),
            ConditionDescriptor::LessThanOrEqual {
                left,
                right,
            } => self.compare(left, right, ctx, |ordering| ordering <= 0.0),
            ConditionDescriptor::And {
                conditions,
            } => {
                for nested in conditions {
                    if !self.evaluate_condition(nested, ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ConditionDescriptor::Or {
                conditions,
            } => {
                for nested in conditions {
                    if self.evaluate_condition(nested, ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ConditionDescriptor::Not {
                conditions,
            } => {
                let Some(first) = conditions.first() else {
                    return Err(ResolveError::InvalidOperation(
                        "not requires a nested condition".to_string(),
                    ));
                };
                Ok(!self.evaluate_condition(first, ctx)?)
            }
        }
    }

    /// Numeric ordering comparison; non-numeric operands yield `false`.
    fn compare(
        &self,
        left: &ValueDescriptor,
        right: &ValueDescriptor,
        ctx: &EventContext,
        accept: impl Fn(f64) -> bool,
    ) -> Result<bool, ResolveError> {
        let left = self.resolve_value(left, ctx)?;
        let right = self.resolve_value(right, ctx)?;
        match (as_numeric(&left), as_numeric(&right)) {
            (Some(lhs), Some(rhs)) => Ok(accept(lhs - rhs)),
            _ => Ok(false),
        }
    }
}

// ============================================================================
// SECTION: Arithmetic
// ============================================================================

/// Applies an arithmetic operator over two resolved operands.
///
/// Integer pairs stay integers except for division, which always promotes to
/// a double; division and modulo by zero yield `null`.
fn apply_arithmetic(
    op: ComputedOp,
    left: &StoreValue,
    right: &StoreValue,
) -> Result<StoreValue, ResolveError> {
    if let (StoreValue::Integer(lhs), StoreValue::Integer(rhs)) = (left, right)
        && op != ComputedOp::Divide
    {
        return Ok(integer_arithmetic(op, *lhs, *rhs));
    }
    let (Some(lhs), Some(rhs)) = (as_numeric(left), as_numeric(right)) else {
        return Err(ResolveError::InvalidOperation(format!(
            "computed {op:?} over non-numeric operands ({}, {})",
            left.kind(),
            right.kind()
        )));
    };
    let result = match op {
        ComputedOp::Add => lhs + rhs,
        ComputedOp::Subtract => lhs - rhs,
        ComputedOp::Multiply => lhs * rhs,
        ComputedOp::Divide | ComputedOp::Modulo => {
            if rhs == 0.0 {
                return Ok(StoreValue::Null);
            }
            if op == ComputedOp::Divide { lhs / rhs } else { lhs % rhs }
        }
        ComputedOp::Template => {
            return Err(ResolveError::InvalidOperation(
                "template is not an arithmetic operator".to_string(),
            ));
        }
    };
    Ok(StoreValue::Number(result))
}

/// Integer-preserving arithmetic; overflow promotes to a double.
fn integer_arithmetic(op: ComputedOp, lhs: i64, rhs: i64) -> StoreValue {
    let checked = match op {
        ComputedOp::Add => lhs.checked_add(rhs),
        ComputedOp::Subtract => lhs.checked_sub(rhs),
        ComputedOp::Multiply => lhs.checked_mul(rhs),
        ComputedOp::Modulo => {
            if rhs == 0 {
                return StoreValue::Null;
            }
            lhs.checked_rem(rhs)
        }
        ComputedOp::Divide | ComputedOp::Template => None,
    };
    checked.map_or_else(
        || {
            #[allow(clippy::cast_precision_loss, reason = "overflow fallback")]
            let promoted = match op {
                ComputedOp::Add => lhs as f64 + rhs as f64,
                ComputedOp::Subtract => lhs as f64 - rhs as f64,
                _ => lhs as f64 * rhs as f64,
            };
            StoreValue::Number(promoted)
        },
        StoreValue::Integer,
    )
}

/// Promotes integers and doubles to a comparable double.
fn as_numeric(value: &StoreValue) -> Option<f64> {
    match value {
        StoreValue::Number(number) => Some(*number),
        StoreValue::Integer(int) => {
            #[allow(clippy::cast_precision_loss, reason = "comparison promotion")]
            let promoted = *int as f64;
            Some(promoted)
        }
        _ => None,
    }
}

// ============================================================================
// SECTION: Event Data Lookup
// ============================================================================

/// Walks a dotted path into the event payload; absent data yields `null`.
fn lookup_event_data(payload: Option<&Value>, path: &str) -> StoreValue {
    let Some(mut node) = payload else {
        return StoreValue::Null;
    };
    let Ok(steps) = KeyPath::new(path).steps() else {
        return StoreValue::Null;
    };
    for step in steps {
        node = match (step, node) {
            (Step::Key(key), Value::Object(map)) => match map.get(&key) {
                Some(child) => child,
                None => return StoreValue::Null,
            },
            (Step::Index(index), Value::Array(items)) => match items.get(index) {
                Some(child) => child,
                None => return StoreValue::Null,
            },
            _ => return StoreValue::Null,
        };
    }
    StoreValue::from_bare(node)
}
