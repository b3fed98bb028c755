//! Runtime configuration types.

use serde::Deserialize;

use crate::identity::MicroserviceIdentity;

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// This process's own microservice identity.
    pub identity: IdentityConfig,
    /// Log output settings.
    pub telemetry: TelemetryConfig,
}

impl RuntimeConfig {
    /// Identity to register with [`ServiceIdentity`](crate::identity::ServiceIdentity).
    #[must_use]
    pub fn identity(&self) -> MicroserviceIdentity {
        MicroserviceIdentity {
            app_id: self.identity.app_id.clone(),
            service_name: self.identity.service_name.clone(),
            version: self.identity.version.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub app_id: String,
    pub service_name: String,
    pub version: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            app_id: "default".to_string(),
            service_name: "opbind-service".to_string(),
            version: "0.0.1".to_string(),
        }
    }
}

/// Tracing subscriber settings. `RUST_LOG` takes precedence over `filter`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}
