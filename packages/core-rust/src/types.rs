use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::operation::ParamDescriptor;

/// Generic runtime value carried through invocations and codecs.
///
/// Supports all JSON-compatible types plus binary data. A message on the wire
/// is represented as a [`Value::Map`] keyed by field name; the codec layer is
/// responsible for translating field names to wire tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit IEEE 754 float.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// String-keyed map. Uses `BTreeMap` for deterministic encoding order.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in codec diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    /// Builds a [`Value::Map`] from `(name, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Runtime argument set of one call: parameter name -> value.
pub type Arguments = BTreeMap<String, Value>;

/// Declared type of a parameter, a response, or a message field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// Generic placeholder: any value is accepted as-is.
    Any,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    /// Homogeneous sequence.
    Array(Box<TypeRef>),
    /// A named schema message type (e.g. `EchoResponse`).
    Message(String),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Any => f.write_str("any"),
            TypeRef::Bool => f.write_str("bool"),
            TypeRef::Int => f.write_str("int"),
            TypeRef::Float => f.write_str("float"),
            TypeRef::String => f.write_str("string"),
            TypeRef::Bytes => f.write_str("bytes"),
            TypeRef::Array(inner) => write!(f, "array<{inner}>"),
            TypeRef::Message(name) => f.write_str(name),
        }
    }
}

/// The logical type a raw codec is bound to.
///
/// The binder picks one of these per root codec; mappers may use it to shape
/// decoded values, and it is kept on the codec for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    /// Generic placeholder, used for empty messages and parameterless requests.
    Any,
    /// A single declared type.
    Type(TypeRef),
    /// A named parameter set packed into one envelope message.
    Params(Arc<[ParamDescriptor]>),
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Any => f.write_str("any"),
            TargetType::Type(ty) => write!(f, "{ty}"),
            TargetType::Params(params) => {
                f.write_str("(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", p.name, p.ty)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_map_builder_sorts_keys() {
        let v = Value::map([("b", Value::Int(2)), ("a", Value::Int(1))]);
        let Value::Map(m) = v else {
            panic!("expected map");
        };
        let keys: Vec<_> = m.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn type_ref_json_form() {
        let ty: TypeRef = serde_json::from_str(r#"{"array":{"message":"Item"}}"#).unwrap();
        assert_eq!(
            ty,
            TypeRef::Array(Box::new(TypeRef::Message("Item".to_string())))
        );
        assert_eq!(ty.to_string(), "array<Item>");

        let any: TypeRef = serde_json::from_str(r#""any""#).unwrap();
        assert_eq!(any, TypeRef::Any);
    }

    #[test]
    fn target_type_display_lists_params() {
        let params: Arc<[ParamDescriptor]> = vec![
            ParamDescriptor::new("a", TypeRef::Int),
            ParamDescriptor::new("b", TypeRef::Int),
        ]
        .into();
        assert_eq!(TargetType::Params(params).to_string(), "(a: int, b: int)");
        assert_eq!(TargetType::Any.to_string(), "any");
    }
}
