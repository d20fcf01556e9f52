//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; the embedding application
//! decides whether to install this subscriber or its own.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{DashboardConfig, LogFormat};

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "grocify_dashboard=info";

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`, falling back to info level for this crate. The log
/// format (text or JSON) comes from the configuration.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(config: &DashboardConfig) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let is_json = config.log_format == LogFormat::Json;
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let config = DashboardConfig::default();
        // Another test may have installed a subscriber first; either way the
        // second call in this process must fail rather than panic.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
