//! Tracing subscriber setup.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Env var whose filter directives override [`LogConfig::filter`].
pub const LOG_ENV: &str = "ROOFLINE_TRACE";

fn default_filter() -> String {
    "warn".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `"roofline_cache=debug,warn"`.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// Install a global `fmt` subscriber.
///
/// `ROOFLINE_TRACE` wins over the configured filter.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the configured filter does not
/// parse or a global subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> Result<(), ConfigError> {
    let filter = match tracing_subscriber::EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(&config.filter).map_err(|error| {
            ConfigError::InvalidValue {
                field: "log.filter".into(),
                reason: error.to_string(),
            }
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| ConfigError::InvalidValue {
            field: "log".into(),
            reason: format!("failed to initialize tracing subscriber: {error}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_warn() {
        assert_eq!(LogConfig::default().filter, "warn");
    }

    #[test]
    fn configured_filter_parses() {
        let filter = tracing_subscriber::EnvFilter::try_new("roofline_cache=debug,warn");
        assert!(filter.is_ok());
    }
}
