//! # roofline-config
//!
//! Layered configuration loading for Roofline using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ROOFLINE_*` prefix, `__` as separator)
//! 2. Project-level `.roofline/config.toml`
//! 3. User-level `~/.config/roofline/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `ROOFLINE_BACKEND__URL` -> `backend.url`,
//! `ROOFLINE_AUTH__EXPIRY_BUFFER_SECS` -> `auth.expiry_buffer_secs`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use roofline_config::RooflineConfig;
//!
//! let config = RooflineConfig::load_with_dotenv().expect("config");
//! roofline_config::init_tracing(&config.log).expect("tracing");
//!
//! if config.backend.is_configured() {
//!     println!("Backend: {}", config.backend.url);
//! }
//! ```

mod auth;
mod backend;
mod error;
mod log;

pub use auth::AuthConfig;
pub use backend::BackendConfig;
pub use error::ConfigError;
pub use log::{LOG_ENV, LogConfig, init_tracing};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RooflineConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl RooflineConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration and fail unless the backend section is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` if `backend.url` or
    /// `backend.anon_key` is missing.
    pub fn load_for_backend() -> Result<Self, ConfigError> {
        let config = Self::load_with_dotenv()?;
        config.require_backend()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` if the backend section lacks a
    /// URL or key.
    pub fn require_backend(&self) -> Result<&BackendConfig, ConfigError> {
        if self.backend.is_configured() {
            Ok(&self.backend)
        } else {
            Err(ConfigError::NotConfigured {
                section: "backend".into(),
            })
        }
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on
    /// top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".roofline/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("ROOFLINE_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roofline").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = RooflineConfig::default();
        assert!(!config.backend.is_configured());
        assert_eq!(config.auth.expiry_buffer_secs, 60);
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn require_backend_fails_when_unconfigured() {
        let config = RooflineConfig::default();
        assert!(matches!(
            config.require_backend(),
            Err(ConfigError::NotConfigured { section }) if section == "backend"
        ));
    }
}
