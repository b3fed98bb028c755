use serde::{Deserialize, Serialize};

use crate::types::TypeRef;

/// Annotation marking a request message whose fields are the operation's
/// parameters, packed as one envelope.
pub const ANNOTATION_WRAP_ARGUMENTS: &str = "@WrapArguments";

/// Annotation marking a response message that carries the result in a single
/// wrapper field.
pub const ANNOTATION_WRAP_PROPERTY: &str = "@WrapProperty";

/// Name of the wrapper field in a `@WrapProperty` message.
pub const WRAP_PROPERTY_FIELD: &str = "value";

/// Top-level wire message for one side of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    /// Fully qualified message name.
    pub name: String,
    /// Field definitions in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Comment annotations attached to the message definition.
    #[serde(default)]
    pub annotations: Vec<String>,
}

/// Single field definition within a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Logical field name.
    pub name: String,
    /// Wire tag. Unique within the message.
    pub tag: u32,
    /// Declared type of the field.
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl MessageDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Appends a field; tags are taken as given.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, tag: u32, ty: TypeRef) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            tag,
            ty,
        });
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    #[must_use]
    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.iter().any(|a| a == annotation)
    }

    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn field_by_tag(&self, tag: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.tag == tag)
    }
}

// ---------------------------------------------------------------------------
// Shape classification
// ---------------------------------------------------------------------------

/// Whether the message packs all operation parameters into one envelope.
#[must_use]
pub fn wraps_arguments(message: &MessageDescriptor) -> bool {
    message.has_annotation(ANNOTATION_WRAP_ARGUMENTS)
}

/// Whether the message carries its logical value in a single wrapper field.
#[must_use]
pub fn wraps_property(message: &MessageDescriptor) -> bool {
    message.has_annotation(ANNOTATION_WRAP_PROPERTY)
}

/// Whether the message declares no fields at all.
#[must_use]
pub fn is_empty_message(message: &MessageDescriptor) -> bool {
    message.fields.is_empty()
}

/// Shape flags of a message, computed once per descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageShape {
    pub wraps_arguments: bool,
    pub wraps_property: bool,
    pub is_empty: bool,
}

impl MessageShape {
    #[must_use]
    pub fn classify(message: &MessageDescriptor) -> Self {
        Self {
            wraps_arguments: wraps_arguments(message),
            wraps_property: wraps_property(message),
            is_empty: is_empty_message(message),
        }
    }
}
