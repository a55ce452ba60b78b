//! Application configuration read from the environment.
//!
//! `.env` is loaded by `main` before [`AppConfig::from_env`] runs, so values can
//! come from either the file or the real environment.

use super::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

/// Default location of the seed file.
pub const DEFAULT_SEED_CONFIG: &str = "config.toml";

/// Runtime settings of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Address the HTTP server listens on
    pub bind_address: SocketAddr,
    /// Bearer token required on `/api` routes; `None` disables the check
    pub api_token: Option<String>,
    /// TOML file with seed data; missing file is not an error
    pub seed_config: PathBuf,
}

impl AppConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_raw = get("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_raw.parse().map_err(|e| Error::Config {
            message: format!("Invalid BIND_ADDRESS '{bind_raw}': {e}"),
        })?;

        let seed_config =
            PathBuf::from(get("SEED_CONFIG").unwrap_or_else(|| DEFAULT_SEED_CONFIG.to_string()));

        Ok(Self {
            database_url,
            bind_address,
            api_token: get("API_TOKEN"),
            seed_config,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_address.to_string(), DEFAULT_BIND_ADDRESS);
        assert_eq!(config.api_token, None);
        assert_eq!(config.seed_config, PathBuf::from("config.toml"));
    }

    #[test]
    fn test_values_from_lookup() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDRESS", "0.0.0.0:8080"),
            ("API_TOKEN", "secret"),
            ("SEED_CONFIG", "seed/dev.toml"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.seed_config, PathBuf::from("seed/dev.toml"));
    }

    #[test]
    fn test_blank_token_disables_auth() {
        let config = config_from(&[("API_TOKEN", "  ")]).unwrap();
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn test_invalid_bind_address() {
        let result = config_from(&[("BIND_ADDRESS", "not-an-address")]);
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }
}
