//! `opbind` core: value model, message and operation descriptors, shape
//! classification, status families, and the schema mapper contracts.

pub mod codec;
pub mod operation;
pub mod schema;
pub mod status;
pub mod types;
pub mod wire;

pub use codec::{CodecError, Deserializer, MapperFactory, SchemaMapper, Serializer};
pub use operation::{
    OperationDefinition, OperationDescriptor, ParamDescriptor, ResponseTypes, Role,
    SchemaDefinition, SchemaDescriptor, SchemaError,
};
pub use schema::{
    is_empty_message, wraps_arguments, wraps_property, FieldDescriptor, MessageDescriptor,
    MessageShape, ANNOTATION_WRAP_ARGUMENTS, ANNOTATION_WRAP_PROPERTY, WRAP_PROPERTY_FIELD,
};
pub use status::{StatusFamily, STATUS_OK};
pub use types::{Arguments, TargetType, TypeRef, Value};
pub use wire::{TaggedCodec, TaggedMapper};
