//! Tracing subscriber setup.

use garnet_config::LoggingConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{GarnetError, Result};

/// Builds the event filter: `RUST_LOG` when set, the configured directive
/// otherwise.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(config.filter.trim())
        .map_err(|e| GarnetError::Logging(format!("invalid filter '{}': {e}", config.filter)))
}

/// Installs the global tracing subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;

    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .map_err(|e| GarnetError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        // Only meaningful when RUST_LOG is unset, which is the normal test setup.
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            filter: "garnet=notalevel".to_string(),
            json: false,
        };
        assert!(matches!(env_filter(&config), Err(GarnetError::Logging(_))));
    }

    #[test]
    fn test_init_twice_fails_second_time() {
        let config = LoggingConfig::default();
        // Another test may already have installed a subscriber.
        let _ = init_tracing(&config);
        assert!(matches!(init_tracing(&config), Err(GarnetError::Logging(_))));
    }
}
