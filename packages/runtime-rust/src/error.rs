//! Error types of the binding and invocation layers.

use std::fmt;

use opbind_core::{CodecError, Role, StatusFamily};

use crate::engine::EngineStatus;

/// Which side of an operation a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Request => f.write_str("request"),
            MessageKind::Response => f.write_str("response"),
        }
    }
}

/// Configuration errors raised while binding an operation. Fatal for the
/// registration of the affected schema.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error(
        "unexpected operation definition {qualified_name}: {param_count} parameters \
         cannot be carried by an unwrapped request message"
    )]
    AmbiguousRequest {
        qualified_name: String,
        param_count: usize,
    },
    #[error("{kind} message of operation {qualified_name} not found")]
    MessageNotFound {
        qualified_name: String,
        kind: MessageKind,
    },
    #[error("failed to build codec for operation {qualified_name}: {source}")]
    Codec {
        qualified_name: String,
        #[source]
        source: CodecError,
    },
    #[error("failed to create mapper for schema {schema_id}: {source}")]
    Mapper {
        schema_id: String,
        #[source]
        source: CodecError,
    },
}

/// Errors from looking up a codec on a resolved binding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Only success responses have a bound codec.
    #[error("not implemented: no response codec for status {status} ({family})")]
    UnsupportedStatusFamily { status: u16, family: StatusFamily },
    #[error("{role} binding of {qualified_name} holds no {codec}")]
    NotBound {
        qualified_name: String,
        role: Role,
        codec: &'static str,
    },
}

/// Errors from creating an invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    #[error("engine is not ready to accept requests (status: {status})")]
    NotReady { status: EngineStatus },
    #[error("operation {operation_id} not found in schema {schema_id}")]
    OperationNotFound {
        schema_id: String,
        operation_id: String,
    },
    #[error("own service identity has not been registered")]
    IdentityUnavailable,
}

/// Errors from packing or unpacking values with a root codec.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("positional request expects exactly one argument, got {count}")]
    PositionalArity { count: usize },
    #[error("{what} is not a message map (got {found})")]
    NotAMessage {
        what: &'static str,
        found: &'static str,
    },
}
