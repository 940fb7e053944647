// crates/backdrop-core/src/core/value.rs
// ============================================================================
// Module: Backdrop Store Values
// Description: Tagged store value sum with wire encodings and coercion.
// Purpose: Provide the single value representation shared by stores and actions.
// Dependencies: serde, serde_json, url
// ============================================================================

//! ## Overview
//! Every value held by a Backdrop store is a [`StoreValue`]. The type is a
//! tagged sum; pattern matching on the tag is the only dispatch mechanism.
//! Two wire encodings exist: the tagged form `{"type": ..., "value": ...}`
//! used by action value descriptors and the remote backend, and the bare JSON
//! form used by scenario payloads and persistent backends. Decoding bare JSON
//! infers `color` and `url` tags from string shape.
//!
//! Equality is structural and tag-sensitive: `Integer(1)` is not equal to
//! `Number(1.0)`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Value Kinds
// ============================================================================

/// Value kind tags understood by stores, rules, and descriptors.
///
/// # Invariants
/// - Variants are stable for serialization and wire-form matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// UTF-8 string value.
    String,
    /// Double-precision number value.
    Number,
    /// Signed 64-bit integer value.
    Integer,
    /// Boolean value.
    Bool,
    /// Hex color string (`#RRGGBB` or `#RRGGBBAA`).
    Color,
    /// RFC 3986 URL string.
    Url,
    /// Ordered array of store values.
    Array,
    /// String-keyed mapping of store values.
    Object,
    /// Explicit null value.
    Null,
}

impl ValueKind {
    /// Returns the stable wire tag for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Bool => "bool",
            Self::Color => "color",
            Self::Url => "url",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }

    /// Parses a wire tag into a kind.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "bool" | "boolean" => Some(Self::Bool),
            "color" => Some(Self::Color),
            "url" => Some(Self::Url),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "null" => Some(Self::Null),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Decode Errors
// ============================================================================

/// Errors produced while decoding tagged store values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueDecodeError {
    /// Tagged form is not a JSON object with a `type` field.
    #[error("tagged value must be an object with a string `type` field")]
    MalformedTaggedForm,
    /// The `type` tag is not a known value kind.
    #[error("unknown value kind tag: {0}")]
    UnknownKind(String),
    /// The payload does not match the declared kind.
    #[error("value does not match declared kind {expected}: {reason}")]
    KindMismatch {
        /// Kind declared by the tag.
        expected: ValueKind,
        /// Human-readable mismatch description.
        reason: String,
    },
}

// ============================================================================
// SECTION: Store Value
// ============================================================================

/// Tagged store value.
///
/// # Invariants
/// - Equality is structural and tag-sensitive.
/// - Object key order carries no semantic meaning; keys are stored sorted.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue {
    /// UTF-8 string.
    String(String),
    /// Double-precision number.
    Number(f64),
    /// Signed 64-bit integer.
    Integer(i64),
    /// Boolean.
    Bool(bool),
    /// Hex color string (`#RRGGBB` or `#RRGGBBAA`).
    Color(String),
    /// RFC 3986 URL string.
    Url(String),
    /// Ordered array of values.
    Array(Vec<StoreValue>),
    /// String-keyed mapping of values.
    Object(BTreeMap<String, StoreValue>),
    /// Explicit null.
    Null,
}

impl StoreValue {
    /// Returns the kind tag of the value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Number(_) => ValueKind::Number,
            Self::Integer(_) => ValueKind::Integer,
            Self::Bool(_) => ValueKind::Bool,
            Self::Color(_) => ValueKind::Color,
            Self::Url(_) => ValueKind::Url,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
            Self::Null => ValueKind::Null,
        }
    }

    /// Returns true when the value carries the given kind tag.
    #[must_use]
    pub fn is_of_kind(&self, kind: ValueKind) -> bool {
        self.kind() == kind
    }

    /// Returns an empty object value.
    #[must_use]
    pub fn empty_object() -> Self {
        Self::Object(BTreeMap::new())
    }

    /// Structural, tag-sensitive equality.
    ///
    /// `Integer(1)` and `Number(1.0)` encode the same numeric value but are
    /// not deep-equal; cross-tag numeric comparison is the resolver's job.
    #[must_use]
    pub fn deep_equal(&self, other: &Self) -> bool {
        self == other
    }

    // ------------------------------------------------------------------
    // Bare wire form
    // ------------------------------------------------------------------

    /// Decodes a bare JSON value, inferring `color` and `url` string tags.
    ///
    /// A string matching `#` followed by 6 or 8 hex digits becomes a color; a
    /// string accepted by `url::Url::parse` becomes a URL; any other string
    /// stays a plain string.
    #[must_use]
    pub fn from_bare(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => number
                .as_i64()
                .map_or_else(|| Self::Number(number.as_f64().unwrap_or(0.0)), Self::Integer),
            Value::String(text) => Self::from_bare_string(text),
            Value::Array(items) => Self::Array(items.iter().map(Self::from_bare).collect()),
            Value::Object(map) => Self::Object(
                map.iter().map(|(key, item)| (key.clone(), Self::from_bare(item))).collect(),
            ),
        }
    }

    /// Infers the tag for a bare string payload.
    fn from_bare_string(text: &str) -> Self {
        if is_color_literal(text) {
            return Self::Color(text.to_string());
        }
        if url::Url::parse(text).is_ok() {
            return Self::Url(text.to_string());
        }
        Self::String(text.to_string())
    }

    /// Encodes the value as bare JSON.
    #[must_use]
    pub fn to_bare(&self) -> Value {
        match self {
            Self::String(text) | Self::Color(text) | Self::Url(text) => {
                Value::String(text.clone())
            }
            Self::Number(number) => {
                Number::from_f64(*number).map_or(Value::Null, Value::Number)
            }
            Self::Integer(value) => Value::Number(Number::from(*value)),
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_bare).collect()),
            Self::Object(map) => {
                let mut out = Map::new();
                for (key, item) in map {
                    out.insert(key.clone(), item.to_bare());
                }
                Value::Object(out)
            }
            Self::Null => Value::Null,
        }
    }

    // ------------------------------------------------------------------
    // Tagged wire form
    // ------------------------------------------------------------------

    /// Decodes the tagged wire form `{"type": tag, "value": payload}`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueDecodeError`] when the envelope is malformed, the tag is
    /// unknown, or the payload does not match the declared kind.
    pub fn from_tagged(value: &Value) -> Result<Self, ValueDecodeError> {
        let Value::Object(map) = value else {
            return Err(ValueDecodeError::MalformedTaggedForm);
        };
        let Some(Value::String(tag)) = map.get("type") else {
            return Err(ValueDecodeError::MalformedTaggedForm);
        };
        let kind =
            ValueKind::parse(tag).ok_or_else(|| ValueDecodeError::UnknownKind(tag.clone()))?;
        let payload = map.get("value").unwrap_or(&Value::Null);
        Self::decode(kind, payload)
    }

    /// Decodes a payload against a declared kind (the descriptor literal path).
    ///
    /// # Errors
    ///
    /// Returns [`ValueDecodeError::KindMismatch`] when the payload shape does
    /// not satisfy the kind.
    pub fn decode(kind: ValueKind, payload: &Value) -> Result<Self, ValueDecodeError> {
        let mismatch = |reason: &str| ValueDecodeError::KindMismatch {
            expected: kind,
            reason: reason.to_string(),
        };
        match kind {
            ValueKind::String => match payload {
                Value::String(text) => Ok(Self::String(text.clone())),
                _ => Err(mismatch("expected a JSON string")),
            },
            ValueKind::Number => payload
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| mismatch("expected a JSON number")),
            ValueKind::Integer => payload
                .as_i64()
                .map(Self::Integer)
                .ok_or_else(|| mismatch("expected a JSON integer")),
            ValueKind::Bool => match payload {
                Value::Bool(flag) => Ok(Self::Bool(*flag)),
                _ => Err(mismatch("expected a JSON boolean")),
            },
            ValueKind::Color => match payload {
                Value::String(text) if is_color_literal(text) => Ok(Self::Color(text.clone())),
                Value::String(_) => Err(mismatch("expected `#RRGGBB` or `#RRGGBBAA`")),
                _ => Err(mismatch("expected a hex color string")),
            },
            ValueKind::Url => match payload {
                Value::String(text) if url::Url::parse(text).is_ok() => {
                    Ok(Self::Url(text.clone()))
                }
                Value::String(_) => Err(mismatch("expected an absolute RFC 3986 URL")),
                _ => Err(mismatch("expected a URL string")),
            },
            ValueKind::Array => match payload {
                Value::Array(items) => Ok(Self::Array(
                    items.iter().map(Self::from_tagged).collect::<Result<Vec<_>, _>>()?,
                )),
                _ => Err(mismatch("expected a JSON array of tagged values")),
            },
            ValueKind::Object => match payload {
                Value::Object(map) => {
                    let mut out = BTreeMap::new();
                    for (key, item) in map {
                        out.insert(key.clone(), Self::from_tagged(item)?);
                    }
                    Ok(Self::Object(out))
                }
                _ => Err(mismatch("expected a JSON object of tagged values")),
            },
            ValueKind::Null => Ok(Self::Null),
        }
    }

    /// Encodes the value in tagged wire form.
    ///
    /// Encoding is deterministic for a given value: object keys are emitted in
    /// sorted order and nested values use the tagged form recursively.
    #[must_use]
    pub fn to_tagged(&self) -> Value {
        let payload = match self {
            Self::Array(items) => Value::Array(items.iter().map(Self::to_tagged).collect()),
            Self::Object(map) => {
                let mut out = Map::new();
                for (key, item) in map {
                    out.insert(key.clone(), item.to_tagged());
                }
                Value::Object(out)
            }
            Self::Null => Value::Null,
            _ => self.to_bare(),
        };
        let mut envelope = Map::new();
        envelope.insert("type".to_string(), Value::String(self.kind().as_str().to_string()));
        envelope.insert("value".to_string(), payload);
        Value::Object(envelope)
    }

    // ------------------------------------------------------------------
    // Coercion
    // ------------------------------------------------------------------

    /// Leniently coerces the value to the target kind.
    ///
    /// Supported conversions: string↔number↔integer, string→bool via
    /// `true/1/yes` and `false/0/no`, number↔integer via truncation, and
    /// string→color/url only when the string already matches the target
    /// shape. Returns `None` when no conversion applies.
    #[must_use]
    pub fn coerce(&self, kind: ValueKind) -> Option<Self> {
        if self.kind() == kind {
            return Some(self.clone());
        }
        match kind {
            ValueKind::String => match self {
                Self::Number(_) | Self::Integer(_) => Some(Self::String(self.stringify())),
                _ => None,
            },
            ValueKind::Number => match self {
                Self::Integer(value) => {
                    // Exactness above 2^53 is not preserved; lenient mode accepts that.
                    #[allow(clippy::cast_precision_loss, reason = "lenient numeric widening")]
                    let widened = *value as f64;
                    Some(Self::Number(widened))
                }
                Self::String(text) => text.trim().parse::<f64>().ok().map(Self::Number),
                _ => None,
            },
            ValueKind::Integer => match self {
                Self::Number(value) => truncate_to_integer(*value),
                Self::String(text) => {
                    let trimmed = text.trim();
                    trimmed.parse::<i64>().ok().map(Self::Integer).or_else(|| {
                        trimmed.parse::<f64>().ok().and_then(truncate_to_integer)
                    })
                }
                _ => None,
            },
            ValueKind::Bool => match self {
                Self::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => Some(Self::Bool(true)),
                    "false" | "0" | "no" => Some(Self::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            ValueKind::Color => match self {
                Self::String(text) if is_color_literal(text) => Some(Self::Color(text.clone())),
                _ => None,
            },
            ValueKind::Url => match self {
                Self::String(text) if url::Url::parse(text).is_ok() => {
                    Some(Self::Url(text.clone()))
                }
                _ => None,
            },
            ValueKind::Array | ValueKind::Object | ValueKind::Null => None,
        }
    }

    // ------------------------------------------------------------------
    // Stringification
    // ------------------------------------------------------------------

    /// Renders the value for template substitution.
    ///
    /// Numbers use their natural decimal form, booleans render `true`/`false`,
    /// null renders the empty string, and arrays/objects render compact bare
    /// JSON.
    #[must_use]
    pub fn stringify(&self) -> String {
        match self {
            Self::String(text) | Self::Color(text) | Self::Url(text) => text.clone(),
            Self::Number(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Bool(flag) => {
                if *flag {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            Self::Null => String::new(),
            Self::Array(_) | Self::Object(_) => self.to_bare().to_string(),
        }
    }
}

impl Serialize for StoreValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_tagged().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StoreValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Self::from_tagged(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Coercion Helpers
// ============================================================================

/// Truncates a finite double to an integer value.
fn truncate_to_integer(value: f64) -> Option<StoreValue> {
    if !value.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, reason = "truncating coercion")]
    let truncated = value.trunc() as i64;
    Some(StoreValue::Integer(truncated))
}

// ============================================================================
// SECTION: Color Literals
// ============================================================================

/// Returns true when the string matches `#` plus 6 or 8 hex digits.
#[must_use]
pub fn is_color_literal(text: &str) -> bool {
    let Some(digits) = text.strip_prefix('#') else {
        return false;
    };
    (digits.len() == 6 || digits.len() == 8) && digits.chars().all(|ch| ch.is_ascii_hexdigit())
}
