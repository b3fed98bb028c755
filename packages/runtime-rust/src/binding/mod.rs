//! Operation binding: the resolved root codecs of one operation.
//!
//! 1. **Plan** (`plan`): shapes + parameter count -> `BindingPlan`
//! 2. **Binder** (`binder`): plan + schema mapper -> `OperationBinding`
//! 3. **Root codecs** (`root`): raw codec + wrap/positional metadata

pub mod binder;
pub mod plan;
pub mod root;

use std::sync::Arc;

use opbind_core::{OperationDescriptor, Role, StatusFamily};

pub use binder::CodecBinder;
pub use plan::{AmbiguousRequest, BindingPlan, RequestPlan, ResponseCodecs, ResponsePlan};
pub use root::{RootDeserializer, RootSerializer};

use crate::error::LookupError;

/// Role-specific root codecs. Only one request direction is ever bound.
#[derive(Debug, Clone)]
pub enum BindingSide {
    Provider {
        request_deserializer: RootDeserializer,
        response_serializer: RootSerializer,
        response_deserializer: RootDeserializer,
    },
    Consumer {
        request_serializer: RootSerializer,
        response_deserializer: RootDeserializer,
    },
}

/// Immutable per-operation binding, built once at registration.
#[derive(Debug, Clone)]
pub struct OperationBinding {
    operation: Arc<OperationDescriptor>,
    side: BindingSide,
}

impl OperationBinding {
    #[must_use]
    pub fn new(operation: Arc<OperationDescriptor>, side: BindingSide) -> Self {
        Self { operation, side }
    }

    #[must_use]
    pub fn operation(&self) -> &Arc<OperationDescriptor> {
        &self.operation
    }

    #[must_use]
    pub fn side(&self) -> &BindingSide {
        &self.side
    }

    #[must_use]
    pub fn role(&self) -> Role {
        match self.side {
            BindingSide::Provider { .. } => Role::Provider,
            BindingSide::Consumer { .. } => Role::Consumer,
        }
    }

    /// Present only on consumer bindings.
    #[must_use]
    pub fn request_serializer(&self) -> Option<&RootSerializer> {
        match &self.side {
            BindingSide::Consumer {
                request_serializer, ..
            } => Some(request_serializer),
            BindingSide::Provider { .. } => None,
        }
    }

    /// Present only on provider bindings.
    #[must_use]
    pub fn request_deserializer(&self) -> Option<&RootDeserializer> {
        match &self.side {
            BindingSide::Provider {
                request_deserializer,
                ..
            } => Some(request_deserializer),
            BindingSide::Consumer { .. } => None,
        }
    }

    /// # Errors
    ///
    /// - `LookupError::UnsupportedStatusFamily` for any non-2xx status.
    /// - `LookupError::NotBound` if this role binds no response serializer.
    pub fn find_response_serializer(&self, status: u16) -> Result<&RootSerializer, LookupError> {
        ensure_success(status)?;
        match &self.side {
            BindingSide::Provider {
                response_serializer,
                ..
            } => Ok(response_serializer),
            BindingSide::Consumer { .. } => Err(self.not_bound("response serializer")),
        }
    }

    /// # Errors
    ///
    /// Returns `LookupError::UnsupportedStatusFamily` for any non-2xx status.
    pub fn find_response_deserializer(
        &self,
        status: u16,
    ) -> Result<&RootDeserializer, LookupError> {
        ensure_success(status)?;
        match &self.side {
            BindingSide::Provider {
                response_deserializer,
                ..
            }
            | BindingSide::Consumer {
                response_deserializer,
                ..
            } => Ok(response_deserializer),
        }
    }

    fn not_bound(&self, codec: &'static str) -> LookupError {
        LookupError::NotBound {
            qualified_name: self.operation.qualified_name().to_string(),
            role: self.role(),
            codec,
        }
    }
}

// Only one response schema per operation is supported: the success one.
fn ensure_success(status: u16) -> Result<(), LookupError> {
    let family = StatusFamily::of(status);
    if family.is_success() {
        Ok(())
    } else {
        Err(LookupError::UnsupportedStatusFamily { status, family })
    }
}
