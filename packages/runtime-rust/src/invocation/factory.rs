//! Construction of consumer and provider invocations.

use std::sync::Arc;

use opbind_core::{Arguments, OperationDescriptor, SchemaDescriptor};
use tracing::{debug, trace};

use super::{Endpoint, Invocation, InvocationTarget, ReferenceConfig, SRC_MICROSERVICE};
use crate::engine::EngineState;
use crate::error::InvocationError;
use crate::identity::ServiceIdentity;

/// Builds invocations with the process's identity and readiness state.
#[derive(Debug, Clone)]
pub struct InvocationFactory {
    identity: Arc<ServiceIdentity>,
    engine: Arc<EngineState>,
}

impl InvocationFactory {
    #[must_use]
    pub fn new(identity: Arc<ServiceIdentity>, engine: Arc<EngineState>) -> Self {
        Self { identity, engine }
    }

    /// Creates an outgoing invocation stamped with this service's name under
    /// [`SRC_MICROSERVICE`].
    ///
    /// # Errors
    ///
    /// Returns `InvocationError::IdentityUnavailable` if no identity is registered.
    pub fn for_consumer(
        &self,
        reference: Arc<ReferenceConfig>,
        operation: Arc<OperationDescriptor>,
        arguments: Arguments,
    ) -> Result<Invocation, InvocationError> {
        let source = self.identity.service_name()?;
        let mut invocation =
            Invocation::new(operation, InvocationTarget::Consumer(reference), arguments);
        invocation.add_context(SRC_MICROSERVICE, source);
        trace!(
            id = %invocation.id(),
            operation = %invocation.operation().qualified_name(),
            "consumer invocation created"
        );
        Ok(invocation)
    }

    /// Resolves `operation_id` in `schema` and delegates to
    /// [`for_consumer`](Self::for_consumer).
    ///
    /// # Errors
    ///
    /// - `InvocationError::OperationNotFound` if the schema has no such operation.
    /// - `InvocationError::IdentityUnavailable` if no identity is registered.
    pub fn for_consumer_by_id(
        &self,
        reference: Arc<ReferenceConfig>,
        schema: &SchemaDescriptor,
        operation_id: &str,
        arguments: Arguments,
    ) -> Result<Invocation, InvocationError> {
        let Some(operation) = schema.find_operation(operation_id) else {
            debug!(schema = %schema.schema_id(), operation_id, "operation not found");
            return Err(InvocationError::OperationNotFound {
                schema_id: schema.schema_id().to_string(),
                operation_id: operation_id.to_string(),
            });
        };
        self.for_consumer(reference, Arc::clone(operation), arguments)
    }

    /// Creates an incoming invocation. Carries no caller identity.
    ///
    /// # Errors
    ///
    /// Returns `InvocationError::NotReady` unless the engine is `Up`.
    pub fn for_provider(
        &self,
        endpoint: Arc<Endpoint>,
        operation: Arc<OperationDescriptor>,
        arguments: Arguments,
    ) -> Result<Invocation, InvocationError> {
        self.engine.ensure_status_up().inspect_err(|e| {
            debug!(operation = %operation.qualified_name(), error = %e, "provider invocation rejected");
        })?;
        let invocation = Invocation::new(operation, InvocationTarget::Provider(endpoint), arguments);
        trace!(
            id = %invocation.id(),
            operation = %invocation.operation().qualified_name(),
            "provider invocation created"
        );
        Ok(invocation)
    }
}
