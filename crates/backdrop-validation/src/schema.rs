// crates/backdrop-validation/src/schema.rs
// ============================================================================
// Module: Backdrop Validation Schema
// Description: Declarative schema model decoded from inbound configuration.
// Purpose: Define the constraint vocabulary the engine traverses.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The schema model mirrors the JSON-schema subset Backdrop accepts: a type
//! constraint, enumeration and const matching, the `allOf`/`anyOf`/`oneOf`/
//! `not` combinators, string/number/array/object constraints, `format`
//! annotations, and `$ref` pointers into `#/definitions/*`. Schemas are
//! plain data; the engine owns traversal, limits, and error reporting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Type Constraint
// ============================================================================

/// JSON type names accepted by the `type` constraint.
///
/// # Invariants
/// - Variants are stable for schema decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// JSON null.
    Null,
    /// JSON boolean.
    Bool,
    /// Any JSON number.
    Number,
    /// JSON number with no fractional part.
    Integer,
    /// JSON string.
    String,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
}

impl SchemaType {
    /// Returns true when the value inhabits the type.
    ///
    /// `integer` accepts any number representable as `i64`/`u64`; `number`
    /// accepts integers as well, per JSON-schema semantics.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Null => value.is_null(),
            Self::Bool => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::String => value.is_string(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    /// Returns the stable name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

// ============================================================================
// SECTION: String Formats
// ============================================================================

/// Named string formats checked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringFormat {
    /// RFC 3339 date-time, round-trippable.
    DateTime,
    /// Email address.
    Email,
    /// DNS hostname.
    Hostname,
    /// Dotted IPv4 address.
    Ipv4,
    /// IPv6 address.
    Ipv6,
    /// Absolute URI.
    Uri,
    /// UUID string.
    Uuid,
}

// ============================================================================
// SECTION: Schema Nodes
// ============================================================================

/// `additionalProperties` constraint: a blanket switch or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// Allow (`true`) or forbid (`false`) undeclared properties.
    Allowed(bool),
    /// Validate undeclared properties against a schema.
    Schema(Box<SchemaNode>),
}

/// Single schema node; all constraints are optional and conjunctive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// Reference into `#/definitions/*`; other constraints on the same node
    /// are ignored when present.
    #[serde(default, rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Type constraint.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    /// Enumeration constraint: the value must equal one member.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<Value>>,
    /// Constant constraint: the value must equal exactly.
    #[serde(default, rename = "const", skip_serializing_if = "Option::is_none")]
    pub constant: Option<Value>,
    /// All sub-schemas must accept the value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaNode>,
    /// At least one sub-schema must accept the value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaNode>,
    /// Exactly one sub-schema must accept the value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaNode>,
    /// The sub-schema must reject the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<SchemaNode>>,
    /// Minimum string length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum string length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular-expression constraint on strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Named string format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<StringFormat>,
    /// Inclusive numeric minimum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive numeric maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Minimum array length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    /// Maximum array length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Schema applied to every array element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// Property names that must be present on objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Schemas for declared object properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,
    /// Constraint on undeclared object properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
}

impl SchemaNode {
    /// Creates a node constraining only the type.
    #[must_use]
    pub fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }
}

// ============================================================================
// SECTION: Schema Document
// ============================================================================

/// Root schema plus its shared definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// Reusable definitions addressed by `#/definitions/<name>`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, SchemaNode>,
    /// Root node applied to the validated value.
    #[serde(flatten)]
    pub root: SchemaNode,
}

impl Schema {
    /// Creates a schema from a root node with no definitions.
    #[must_use]
    pub fn from_root(root: SchemaNode) -> Self {
        Self {
            definitions: BTreeMap::new(),
            root,
        }
    }

    /// Resolves a `#/definitions/<name>` pointer.
    #[must_use]
    pub fn resolve(&self, reference: &str) -> Option<&SchemaNode> {
        let name = reference.strip_prefix("#/definitions/")?;
        self.definitions.get(name)
    }
}
