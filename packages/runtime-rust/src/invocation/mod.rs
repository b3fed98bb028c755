//! Invocations: one call of an operation, on either side.

pub mod factory;

use std::collections::HashMap;
use std::sync::Arc;

use opbind_core::{Arguments, OperationDescriptor, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use factory::InvocationFactory;

/// Context key carrying the calling microservice's name.
pub const SRC_MICROSERVICE: &str = "x-cse-src-microservice";

/// Consumer-side reference to a remote microservice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub microservice_name: String,
    #[serde(default)]
    pub transport: Option<String>,
    #[serde(default = "default_version_rule")]
    pub version_rule: String,
}

fn default_version_rule() -> String {
    "0.0.0+".to_string()
}

impl ReferenceConfig {
    #[must_use]
    pub fn new(microservice_name: impl Into<String>) -> Self {
        Self {
            microservice_name: microservice_name.into(),
            transport: None,
            version_rule: default_version_rule(),
        }
    }
}

/// Provider-side endpoint a request arrived on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub transport: String,
    pub address: String,
}

impl Endpoint {
    #[must_use]
    pub fn new(transport: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            transport: transport.into(),
            address: address.into(),
        }
    }
}

/// Where an invocation is headed (consumer) or came from (provider).
#[derive(Debug, Clone)]
pub enum InvocationTarget {
    Consumer(Arc<ReferenceConfig>),
    Provider(Arc<Endpoint>),
}

/// A single call of an operation.
#[derive(Debug, Clone)]
pub struct Invocation {
    id: Uuid,
    operation: Arc<OperationDescriptor>,
    target: InvocationTarget,
    arguments: Arguments,
    context: HashMap<String, String>,
}

impl Invocation {
    pub(crate) fn new(
        operation: Arc<OperationDescriptor>,
        target: InvocationTarget,
        arguments: Arguments,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation,
            target,
            arguments,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn operation(&self) -> &Arc<OperationDescriptor> {
        &self.operation
    }

    #[must_use]
    pub fn target(&self) -> &InvocationTarget {
        &self.target
    }

    #[must_use]
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    #[must_use]
    pub fn into_arguments(self) -> Arguments {
        self.arguments
    }

    /// Role implied by the target, independent of the descriptor's role.
    #[must_use]
    pub fn role(&self) -> Role {
        match self.target {
            InvocationTarget::Consumer(_) => Role::Consumer,
            InvocationTarget::Provider(_) => Role::Provider,
        }
    }

    #[must_use]
    pub fn reference(&self) -> Option<&ReferenceConfig> {
        match &self.target {
            InvocationTarget::Consumer(reference) => Some(reference.as_ref()),
            InvocationTarget::Provider(_) => None,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> Option<&Endpoint> {
        match &self.target {
            InvocationTarget::Provider(endpoint) => Some(endpoint.as_ref()),
            InvocationTarget::Consumer(_) => None,
        }
    }

    pub fn add_context(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.context.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn context(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contexts(&self) -> &HashMap<String, String> {
        &self.context
    }
}
