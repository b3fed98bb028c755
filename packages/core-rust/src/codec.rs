//! Contracts of the schema mapper collaborator.
//!
//! The binder never encodes bytes itself: it asks a [`SchemaMapper`] for the
//! request/response messages of an operation and for raw codecs bound to a
//! message plus a [`TargetType`]. Any tagged-field engine can sit behind these
//! traits; [`crate::wire::TaggedMapper`] is the reference implementation.

use std::fmt;
use std::sync::Arc;

use crate::operation::SchemaDescriptor;
use crate::schema::MessageDescriptor;
use crate::types::{TargetType, Value};

/// Errors produced by raw codecs and mapper construction.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("message {message} expects a map of fields, got {found}")]
    NotAMessage { message: String, found: &'static str },
    #[error("message {message} has no field named {field}")]
    UnknownField { message: String, field: String },
    #[error("message {message}: {detail}")]
    InvalidPayload { message: String, detail: String },
    #[error("no mapper available for schema {schema_id}: {reason}")]
    MapperUnavailable { schema_id: String, reason: String },
    #[error("encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Raw encoder bound to one message descriptor and target type.
pub trait Serializer: Send + Sync + fmt::Debug {
    /// The message this codec writes.
    fn message(&self) -> &MessageDescriptor;

    /// The logical type this codec was bound to.
    fn target(&self) -> &TargetType;

    /// Encodes a message value (a field-name keyed map, or `Null` for the
    /// empty message).
    ///
    /// # Errors
    ///
    /// Returns a `CodecError` if the value does not fit the message.
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, CodecError>;
}

/// Raw decoder bound to one message descriptor and target type.
pub trait Deserializer: Send + Sync + fmt::Debug {
    /// The message this codec reads.
    fn message(&self) -> &MessageDescriptor;

    /// The logical type this codec was bound to.
    fn target(&self) -> &TargetType;

    /// Decodes bytes into a field-name keyed [`Value::Map`].
    ///
    /// # Errors
    ///
    /// Returns a `CodecError` if the bytes are not a valid encoding of the message.
    fn deserialize(&self, bytes: &[u8]) -> Result<Value, CodecError>;
}

/// Per-schema mapper: resolves operation messages and builds raw codecs.
pub trait SchemaMapper: Send + Sync + fmt::Debug {
    /// Request message of the operation, if the schema declares it.
    fn request_message(&self, operation_id: &str) -> Option<Arc<MessageDescriptor>>;

    /// Response message of the operation, if the schema declares it.
    fn response_message(&self, operation_id: &str) -> Option<Arc<MessageDescriptor>>;

    /// # Errors
    ///
    /// Returns a `CodecError` if no serializer can be built for the pair.
    fn create_serializer(
        &self,
        message: &Arc<MessageDescriptor>,
        target: TargetType,
    ) -> Result<Arc<dyn Serializer>, CodecError>;

    /// # Errors
    ///
    /// Returns a `CodecError` if no deserializer can be built for the pair.
    fn create_deserializer(
        &self,
        message: &Arc<MessageDescriptor>,
        target: TargetType,
    ) -> Result<Arc<dyn Deserializer>, CodecError>;
}

/// Creates the mapper of a schema. Called at most once per schema by the
/// runtime's mapper cache.
pub trait MapperFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns `CodecError::MapperUnavailable` if the schema cannot be mapped.
    fn create_mapper(&self, schema: &SchemaDescriptor) -> Result<Arc<dyn SchemaMapper>, CodecError>;
}

impl<F> MapperFactory for F
where
    F: Fn(&SchemaDescriptor) -> Result<Arc<dyn SchemaMapper>, CodecError> + Send + Sync,
{
    fn create_mapper(&self, schema: &SchemaDescriptor) -> Result<Arc<dyn SchemaMapper>, CodecError> {
        self(schema)
    }
}
