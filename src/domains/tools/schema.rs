//! Schema extraction - turns a tool's Rust parameter and output types into
//! the descriptor advertised to callers and used to validate calls.
//!
//! The JSON Schema for each type is generated by `schemars` and then mapped
//! onto the small set of value kinds the protocol understands. Anything that
//! does not map cleanly is rejected here, at registration time, so dispatch
//! never meets a parameter it cannot check.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::RegistrationError;

// ============================================================================
// Kinds
// ============================================================================

/// The kind of a single argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    Mapping,
    Sequence,
    Optional(Box<ValueKind>),
}

impl ValueKind {
    /// Whether `value` is acceptable for this kind.
    ///
    /// Integers are accepted where floats are expected; `null` is accepted
    /// only by optional kinds.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Mapping => value.is_object(),
            Self::Sequence => value.is_array(),
            Self::Optional(inner) => value.is_null() || inner.accepts(value),
        }
    }

    /// Map a JSON Schema `type` name onto a kind.
    fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Float),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Mapping),
            "array" => Some(Self::Sequence),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("boolean"),
            Self::Mapping => f.write_str("mapping"),
            Self::Sequence => f.write_str("sequence"),
            Self::Optional(inner) => write!(f, "optional<{}>", inner),
        }
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(inner) = s.strip_prefix("optional<").and_then(|r| r.strip_suffix('>')) {
            return Ok(Self::Optional(Box::new(inner.parse()?)));
        }
        match s {
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "boolean" => Ok(Self::Boolean),
            "mapping" => Ok(Self::Mapping),
            "sequence" => Ok(Self::Sequence),
            other => Err(format!("unknown value kind: {}", other)),
        }
    }
}

impl From<ValueKind> for String {
    fn from(kind: ValueKind) -> Self {
        kind.to_string()
    }
}

impl TryFrom<String> for ValueKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The declared result of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ResultKind {
    /// The tool returns nothing (serialised as `null`).
    Unit,
    /// The tool returns an arbitrary JSON value.
    Any,
    Value(ValueKind),
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("unit"),
            Self::Any => f.write_str("any"),
            Self::Value(kind) => kind.fmt(f),
        }
    }
}

impl FromStr for ResultKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unit" => Ok(Self::Unit),
            "any" => Ok(Self::Any),
            other => other.parse().map(Self::Value),
        }
    }
}

impl From<ResultKind> for String {
    fn from(kind: ResultKind) -> Self {
        kind.to_string()
    }
}

impl TryFrom<String> for ResultKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// One declared parameter of a tool.
///
/// A required parameter never has a default; an optional one always does
/// (possibly `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ValueKind,
    pub required: bool,
    /// Present (possibly `null`) exactly when `required` is false.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A `default` key that is present deserializes to `Some`, even when `null`.
fn deserialize_present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

/// Everything a caller needs to know to invoke a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    pub returns: ResultKind,
}

impl ToolDescriptor {
    /// Build a descriptor from a parameter type `P` and an output type `O`.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] if the name is empty or either type
    /// cannot be described with the protocol's value kinds.
    pub fn extract<P, O>(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, RegistrationError>
    where
        P: JsonSchema,
        O: JsonSchema,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistrationError::EmptyName);
        }

        let parameters = extract_parameters::<P>(&name)?;
        let returns = extract_result_kind::<O>(&name)?;

        Ok(Self {
            name,
            description: description.into(),
            parameters,
            returns,
        })
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

// ============================================================================
// Extraction
// ============================================================================

fn schema_value<T: JsonSchema>(tool: &str) -> Result<Value, RegistrationError> {
    serde_json::to_value(schemars::schema_for!(T)).map_err(|e| RegistrationError::InvalidSchema {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// Extract the ordered parameter list from a parameter struct's schema.
pub fn extract_parameters<P: JsonSchema>(tool: &str) -> Result<Vec<ParameterSpec>, RegistrationError> {
    let root = schema_value::<P>(tool)?;
    let invalid = |reason: &str| RegistrationError::InvalidSchema {
        tool: tool.to_string(),
        reason: reason.to_string(),
    };

    let root = root
        .as_object()
        .ok_or_else(|| invalid("parameters must be a struct with named fields"))?;
    if root.get("type").and_then(Value::as_str) != Some("object") {
        return Err(invalid("parameters must be a struct with named fields"));
    }

    let required: Vec<&str> = root
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let empty = Map::new();
    let properties = match root.get("properties") {
        Some(Value::Object(props)) => props,
        Some(_) => return Err(invalid("'properties' is not an object")),
        None => &empty,
    };

    properties
        .iter()
        .map(|(name, schema)| {
            let kind = kind_of(schema).map_err(|reason| RegistrationError::UnsupportedParameter {
                tool: tool.to_string(),
                parameter: name.clone(),
                reason,
            })?;
            let is_required = required.contains(&name.as_str());
            let default = if is_required {
                None
            } else {
                Some(schema.get("default").cloned().unwrap_or(Value::Null))
            };
            let description = schema
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string);

            Ok(ParameterSpec {
                name: name.clone(),
                kind,
                required: is_required,
                default,
                description,
            })
        })
        .collect()
}

/// Extract the declared result kind from an output type's schema.
pub fn extract_result_kind<O: JsonSchema>(tool: &str) -> Result<ResultKind, RegistrationError> {
    let schema = schema_value::<O>(tool)?;

    // `serde_json::Value` and friends produce a schema with no type at all.
    let untyped = match &schema {
        Value::Bool(true) => true,
        Value::Object(obj) => !obj.contains_key("type") && !has_composition(obj),
        _ => false,
    };
    if untyped {
        return Ok(ResultKind::Any);
    }
    if schema.get("type").and_then(Value::as_str) == Some("null") {
        return Ok(ResultKind::Unit);
    }

    kind_of(&schema)
        .map(ResultKind::Value)
        .map_err(|reason| RegistrationError::UnsupportedReturn {
            tool: tool.to_string(),
            reason,
        })
}

fn has_composition(obj: &Map<String, Value>) -> bool {
    ["$ref", "anyOf", "oneOf", "allOf", "enum", "const"]
        .iter()
        .any(|key| obj.contains_key(*key))
}

/// Map one property schema onto a value kind.
fn kind_of(schema: &Value) -> Result<ValueKind, String> {
    let obj = match schema {
        Value::Object(obj) => obj,
        Value::Bool(_) => return Err("untyped values are not supported".to_string()),
        _ => return Err("malformed schema".to_string()),
    };

    if obj.contains_key("$ref") {
        return Err("nested named types are not supported".to_string());
    }
    if obj.contains_key("anyOf") || obj.contains_key("oneOf") || obj.contains_key("allOf") {
        return Err("union types are not supported".to_string());
    }

    match obj.get("type") {
        Some(Value::String(name)) => {
            ValueKind::from_type_name(name).ok_or_else(|| format!("unsupported type '{}'", name))
        }
        Some(Value::Array(names)) => {
            let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
            match names.as_slice() {
                [ty, "null"] | ["null", ty] => ValueKind::from_type_name(ty)
                    .map(|k| ValueKind::Optional(Box::new(k)))
                    .ok_or_else(|| format!("unsupported type '{}'", ty)),
                _ => Err(format!("ambiguous type {:?}", names)),
            }
        }
        _ => Err("untyped values are not supported".to_string()),
    }
}
