//! The process's own microservice identity.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::InvocationError;

/// Identity under which this process calls other services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroserviceIdentity {
    pub app_id: String,
    pub service_name: String,
    pub version: String,
}

/// Holder of the registered identity.
///
/// Written once during startup, read by every consumer invocation.
#[derive(Debug, Default)]
pub struct ServiceIdentity {
    current: ArcSwapOption<MicroserviceIdentity>,
}

impl ServiceIdentity {
    /// Creates an empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a holder with `identity` already registered.
    #[must_use]
    pub fn with(identity: MicroserviceIdentity) -> Self {
        Self {
            current: ArcSwapOption::from_pointee(identity),
        }
    }

    /// Stores `identity` and returns the one it replaced.
    pub fn register(&self, identity: MicroserviceIdentity) -> Option<Arc<MicroserviceIdentity>> {
        let next = Arc::new(identity);
        let previous = self.current.swap(Some(Arc::clone(&next)));
        match previous.as_deref() {
            Some(old) if *old != *next => {
                warn!(from = %old.service_name, to = %next.service_name, "service identity replaced");
            }
            None => {
                info!(app_id = %next.app_id, service = %next.service_name, version = %next.version, "service identity registered");
            }
            Some(_) => {}
        }
        previous
    }

    #[must_use]
    pub fn current(&self) -> Option<Arc<MicroserviceIdentity>> {
        self.current.load_full()
    }

    /// # Errors
    ///
    /// Returns `InvocationError::IdentityUnavailable` before registration.
    pub fn service_name(&self) -> Result<String, InvocationError> {
        self.current
            .load()
            .as_ref()
            .map(|id| id.service_name.clone())
            .ok_or(InvocationError::IdentityUnavailable)
    }
}
