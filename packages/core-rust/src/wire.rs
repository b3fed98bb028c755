//! Reference tagged-field mapper.
//!
//! # Wire format
//!
//! A message is a `MsgPack` map from field tag (unsigned integer) to field
//! value. Fields whose value is `Null` are omitted. A message with no fields
//! present is encoded as zero bytes, and zero bytes decode to an empty
//! message. Tags not declared by the message are skipped on decode, so older
//! readers tolerate newer writers.
//!
//! Nested values use plain `MsgPack` types; nested maps keep string keys.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rmpv::Value as Wire;

use crate::codec::{CodecError, Deserializer, SchemaMapper, Serializer};
use crate::schema::MessageDescriptor;
use crate::types::{TargetType, Value};

#[derive(Debug, Clone)]
struct OperationMessages {
    request: Arc<MessageDescriptor>,
    response: Arc<MessageDescriptor>,
}

/// In-memory mapper holding the request/response messages of each operation.
#[derive(Debug, Clone, Default)]
pub struct TaggedMapper {
    operations: HashMap<String, OperationMessages>,
}

impl TaggedMapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the request and response messages of `operation_id`.
    #[must_use]
    pub fn with_operation(
        mut self,
        operation_id: impl Into<String>,
        request: MessageDescriptor,
        response: MessageDescriptor,
    ) -> Self {
        self.operations.insert(
            operation_id.into(),
            OperationMessages {
                request: Arc::new(request),
                response: Arc::new(response),
            },
        );
        self
    }
}

impl SchemaMapper for TaggedMapper {
    fn request_message(&self, operation_id: &str) -> Option<Arc<MessageDescriptor>> {
        self.operations
            .get(operation_id)
            .map(|m| Arc::clone(&m.request))
    }

    fn response_message(&self, operation_id: &str) -> Option<Arc<MessageDescriptor>> {
        self.operations
            .get(operation_id)
            .map(|m| Arc::clone(&m.response))
    }

    fn create_serializer(
        &self,
        message: &Arc<MessageDescriptor>,
        target: TargetType,
    ) -> Result<Arc<dyn Serializer>, CodecError> {
        Ok(Arc::new(TaggedCodec::new(message, target)))
    }

    fn create_deserializer(
        &self,
        message: &Arc<MessageDescriptor>,
        target: TargetType,
    ) -> Result<Arc<dyn Deserializer>, CodecError> {
        Ok(Arc::new(TaggedCodec::new(message, target)))
    }
}

/// Raw codec for one message; serves as both serializer and deserializer.
#[derive(Debug, Clone)]
pub struct TaggedCodec {
    message: Arc<MessageDescriptor>,
    target: TargetType,
}

impl TaggedCodec {
    #[must_use]
    pub fn new(message: &Arc<MessageDescriptor>, target: TargetType) -> Self {
        Self {
            message: Arc::clone(message),
            target,
        }
    }

    fn invalid(&self, detail: impl Into<String>) -> CodecError {
        CodecError::InvalidPayload {
            message: self.message.name.clone(),
            detail: detail.into(),
        }
    }
}

impl Serializer for TaggedCodec {
    fn message(&self) -> &MessageDescriptor {
        &self.message
    }

    fn target(&self) -> &TargetType {
        &self.target
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let fields = match value {
            Value::Null => return Ok(Vec::new()),
            Value::Map(fields) => fields,
            other => {
                return Err(CodecError::NotAMessage {
                    message: self.message.name.clone(),
                    found: other.kind(),
                })
            }
        };

        if let Some(unknown) = fields
            .keys()
            .find(|name| self.message.field_by_name(name).is_none())
        {
            return Err(CodecError::UnknownField {
                message: self.message.name.clone(),
                field: unknown.clone(),
            });
        }

        // Declaration order keeps the output stable across map implementations.
        let entries: Vec<(Wire, Wire)> = self
            .message
            .fields
            .iter()
            .filter_map(|field| {
                fields
                    .get(&field.name)
                    .filter(|v| !v.is_null())
                    .map(|v| (Wire::from(field.tag), to_wire(v)))
            })
            .collect();

        if entries.is_empty() {
            return Ok(Vec::new());
        }
        Ok(rmp_serde::to_vec(&Wire::Map(entries))?)
    }
}

impl Deserializer for TaggedCodec {
    fn message(&self) -> &MessageDescriptor {
        &self.message
    }

    fn target(&self) -> &TargetType {
        &self.target
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        if bytes.is_empty() {
            return Ok(Value::Map(BTreeMap::new()));
        }

        let Wire::Map(entries) = rmp_serde::from_slice::<Wire>(bytes)? else {
            return Err(self.invalid("top-level value is not a tag map"));
        };

        let mut fields = BTreeMap::new();
        for (key, raw) in entries {
            let tag = key
                .as_u64()
                .and_then(|t| u32::try_from(t).ok())
                .ok_or_else(|| self.invalid(format!("invalid field tag {key}")))?;
            let Some(field) = self.message.field_by_tag(tag) else {
                tracing::trace!(descriptor = %self.message.name, tag, "skipping unknown field tag");
                continue;
            };
            let value = from_wire(raw).map_err(|detail| {
                self.invalid(format!("field {}: {detail}", field.name))
            })?;
            fields.insert(field.name.clone(), value);
        }
        Ok(Value::Map(fields))
    }
}

fn to_wire(value: &Value) -> Wire {
    match value {
        Value::Null => Wire::Nil,
        Value::Bool(b) => Wire::Boolean(*b),
        Value::Int(i) => Wire::from(*i),
        Value::Float(f) => Wire::F64(*f),
        Value::String(s) => Wire::from(s.as_str()),
        Value::Bytes(b) => Wire::Binary(b.clone()),
        Value::Array(items) => Wire::Array(items.iter().map(to_wire).collect()),
        Value::Map(map) => Wire::Map(
            map.iter()
                .map(|(k, v)| (Wire::from(k.as_str()), to_wire(v)))
                .collect(),
        ),
    }
}

fn from_wire(raw: Wire) -> Result<Value, String> {
    Ok(match raw {
        Wire::Nil => Value::Null,
        Wire::Boolean(b) => Value::Bool(b),
        Wire::Integer(i) => Value::Int(
            i.as_i64()
                .ok_or_else(|| format!("integer {i} out of i64 range"))?,
        ),
        Wire::F32(f) => Value::Float(f64::from(f)),
        Wire::F64(f) => Value::Float(f),
        Wire::String(s) => Value::String(
            s.into_str()
                .ok_or_else(|| "string is not valid UTF-8".to_string())?,
        ),
        Wire::Binary(b) => Value::Bytes(b),
        Wire::Array(items) => Value::Array(
            items
                .into_iter()
                .map(from_wire)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Wire::Map(entries) => {
            let mut map = BTreeMap::new();
            for (k, v) in entries {
                let Wire::String(key) = k else {
                    return Err(format!("nested map key {k} is not a string"));
                };
                let key = key
                    .into_str()
                    .ok_or_else(|| "map key is not valid UTF-8".to_string())?;
                map.insert(key, from_wire(v)?);
            }
            Value::Map(map)
        }
        Wire::Ext(kind, _) => return Err(format!("unsupported extension type {kind}")),
    })
}
