//! Configuration management for the getting-started walkthrough
//!
//! This module handles loading, validating, and providing access to the
//! application configuration. Values come from a TOML file, then environment
//! variables, then command-line overrides applied by the binary.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod validation;

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod validation_tests;

#[cfg(test)]
#[path = "tests/config_mod_tests.rs"]
mod config_mod_tests;

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};
use directories::ProjectDirs;

use serde::{Deserialize, Serialize};

pub use crate::types::LogLevel;
pub use error::ConfigError;

/// Environment variable holding the account endpoint URL.
pub const ACCOUNT_HOST_VAR: &str = "ACCOUNT_HOST";

/// Environment variable holding the account master key.
pub const ACCOUNT_KEY_VAR: &str = "ACCOUNT_KEY";

/// The environment variable prefix for the remaining overrides
const ENV_PREFIX: &str = "GETSTARTED_";

/// File name looked up in the working directory and the OS config directory
pub const DEFAULT_CONFIG_FILE: &str = "getstarted.toml";

/// The application name used for finding config directories
const APP_NAME: &str = "cosmos-getstarted";

/// Main configuration structure.
///
/// Every section has defaults, so an empty or partial TOML file is valid.
///
/// # Example
///
/// ```no_run
/// use cosmos_getstarted::config::Config;
///
/// // Falls back to defaults (plus environment overrides) when the file is absent.
/// let config = Config::load("getstarted.toml").unwrap();
/// assert_eq!(config.database.name, "FamilyDB");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Account endpoint and credentials
    pub account: AccountConfig,

    /// Database and container the walkthrough creates
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Account endpoint and credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Service endpoint URL (`ACCOUNT_HOST`)
    pub host: String,
    /// Base64 master key (`ACCOUNT_KEY`)
    pub key: String,
}

impl AccountConfig {
    /// Creates an account configuration from an endpoint and key.
    pub fn new(host: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            key: key.into(),
        }
    }

    /// The endpoint with surrounding whitespace removed.
    pub fn host(&self) -> &str {
        self.host.trim()
    }

    /// The key with surrounding whitespace removed.
    pub fn key(&self) -> &str {
        self.key.trim()
    }

    /// Checks that both values are present.
    ///
    /// The host is checked before the key, so a configuration missing both
    /// reports `ACCOUNT_HOST is not set`. Whether the host is a usable
    /// endpoint is left to the client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_account(self)
    }
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("host", &self.host)
            .field("key", &if self.key.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}

/// Names and provisioning of the resources the walkthrough creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database id
    pub name: String,
    /// Container id
    pub container: String,
    /// Manual throughput (RU/s) provisioned on the container
    pub throughput: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "FamilyDB".to_string(),
            container: "FamilyCollection".to_string(),
            throughput: 400,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level; `RUST_LOG` still takes precedence when set
    pub level: LogLevel,
}

impl Config {
    /// Loads the configuration from the specified path.
    ///
    /// A missing file is not an error: defaults are used instead. In both
    /// cases environment overrides are applied and the non-account sections
    /// are validated. Account values are validated separately, right before
    /// a client would be opened.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if an override or section is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config = match fs::read_to_string(path) {
            Ok(config_str) => toml::from_str::<Config>(&config_str)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Config file not found at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };

        config.apply_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from `path` when given, otherwise from the first existing
    /// default location:
    /// 1. `./getstarted.toml`
    /// 2. `getstarted.toml` in the OS-specific config directory
    /// 3. built-in defaults
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load(local);
        }

        if let Some(dir) = Self::config_dir() {
            let candidate = dir.join(DEFAULT_CONFIG_FILE);
            if candidate.exists() {
                return Self::load(candidate);
            }
        }

        Self::load(local)
    }

    /// Applies overrides from the process environment.
    ///
    /// `ACCOUNT_HOST` and `ACCOUNT_KEY` are read unprefixed; the rest use the
    /// `GETSTARTED_` prefix, e.g. `GETSTARTED_LOGGING_LEVEL=debug`.
    ///
    /// An account variable that is present but blank replaces the file value,
    /// so it is reported as not set. Blank `GETSTARTED_*` values are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable cannot be parsed.
    pub fn apply_env_vars(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(env::vars())
    }

    /// Applies overrides from an arbitrary set of `(name, value)` pairs.
    pub fn apply_overrides<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if key == ACCOUNT_HOST_VAR {
                self.account.host = value;
                continue;
            }
            if key == ACCOUNT_KEY_VAR {
                self.account.key = value;
                continue;
            }

            // Skip empty values
            if value.trim().is_empty() {
                continue;
            }

            let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match stripped.to_lowercase().as_str() {
                "logging_level" => {
                    self.logging.level = value.parse().map_err(|_| {
                        ConfigError::invalid_value("logging.level", &value, "Invalid log level")
                    })?;
                }
                "database_name" => self.database.name = value,
                "container_name" => self.database.container = value,
                "throughput" => {
                    self.database.throughput = value.trim().parse().map_err(|_| {
                        ConfigError::invalid_value(
                            "database.throughput",
                            &value,
                            "Throughput must be a whole number of RU/s",
                        )
                    })?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Validates the database section.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }

    /// Returns the path to the directory where configuration files should be stored.
    ///
    /// This is OS-specific:
    /// - Linux: `$HOME/.config/cosmos-getstarted`
    /// - macOS: `$HOME/Library/Application Support/com.example.cosmos-getstarted`
    /// - Windows: `%APPDATA%\\example\\cosmos-getstarted\\config`
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "example", APP_NAME)
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.name, "FamilyDB");
        assert_eq!(config.database.container, "FamilyCollection");
        assert_eq!(config.database.throughput, 400);
    }

    #[test]
    fn test_debug_redacts_key() {
        let account = AccountConfig::new("https://localhost:8081/", "c2VjcmV0");
        let rendered = format!("{:?}", account);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("c2VjcmV0"));
    }
}
