//! Tracing subscriber setup.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Installs the global fmt subscriber.
///
/// Returns `Ok(false)` without touching anything if a global subscriber is
/// already set, so hosts and tests may call it repeatedly.
///
/// # Errors
///
/// Returns an error if the configured filter directive is invalid or the
/// subscriber cannot be installed.
pub fn init_tracing(config: &TelemetryConfig) -> anyhow::Result<bool> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let builder = tracing_subscriber::fmt().with_env_filter(build_filter(config)?);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    Ok(true)
}

// `RUST_LOG` wins over the configured directive.
fn build_filter(config: &TelemetryConfig) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter)
            .with_context(|| format!("invalid log filter {:?}", config.filter)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(filter: &str) -> TelemetryConfig {
        TelemetryConfig {
            filter: filter.to_string(),
            json: false,
        }
    }

    #[test]
    fn invalid_filter_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = build_filter(&config("opbind=loudest")).unwrap_err();
        assert!(err.to_string().contains("opbind=loudest"));
    }

    #[test]
    fn valid_filter_is_accepted() {
        assert!(build_filter(&config("opbind_runtime=debug,info")).is_ok());
    }

    #[test]
    fn repeated_init_is_harmless() {
        let config = TelemetryConfig::default();
        if init_tracing(&config).is_ok() {
            assert!(!init_tracing(&config).unwrap());
        }
    }
}
