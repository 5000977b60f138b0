//! Configuration validation
//!
//! This module contains functions for validating the application configuration
//! to ensure all values are present and within acceptable ranges before any
//! request is sent to the document service.

use super::error::ConfigError;
use super::{AccountConfig, Config, DatabaseConfig, ACCOUNT_HOST_VAR, ACCOUNT_KEY_VAR};

/// Smallest manual throughput the service accepts for a container.
pub const MIN_THROUGHPUT: u32 = 400;

/// Manual throughput must be provisioned in steps of this size.
pub const THROUGHPUT_INCREMENT: u32 = 100;

/// Characters the service rejects in database and container ids.
const FORBIDDEN_ID_CHARS: [char; 4] = ['/', '\\', '?', '#'];

/// Validates the database section of the configuration.
///
/// Account values are checked separately by [`validate_account`].
///
/// # Errors
///
/// Returns a `ConfigError` if any validation check fails.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_database_config(&config.database)
}

/// Validates the account endpoint and key.
///
/// Empty or whitespace-only values yield [`ConfigError::NotSet`] naming the
/// variable, host first. Nothing else is checked here: a malformed endpoint
/// is rejected when the client is built and reported like any other failure.
pub fn validate_account(account: &AccountConfig) -> Result<(), ConfigError> {
    if account.host().is_empty() {
        return Err(ConfigError::not_set(ACCOUNT_HOST_VAR));
    }
    if account.key().is_empty() {
        return Err(ConfigError::not_set(ACCOUNT_KEY_VAR));
    }
    Ok(())
}

/// Validates resource ids and provisioning.
fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    validate_resource_id("database.name", &config.name)?;
    validate_resource_id("database.container", &config.container)?;

    if config.throughput < MIN_THROUGHPUT {
        return Err(ConfigError::invalid_value(
            "database.throughput",
            config.throughput,
            format!("Throughput must be at least {} RU/s", MIN_THROUGHPUT),
        ));
    }
    if config.throughput % THROUGHPUT_INCREMENT != 0 {
        return Err(ConfigError::invalid_value(
            "database.throughput",
            config.throughput,
            format!("Throughput must be a multiple of {} RU/s", THROUGHPUT_INCREMENT),
        ));
    }

    Ok(())
}

fn validate_resource_id(field: &str, id: &str) -> Result<(), ConfigError> {
    if id.trim().is_empty() {
        return Err(ConfigError::invalid_value(field, id, "Id cannot be empty"));
    }
    if id.ends_with(' ') {
        return Err(ConfigError::invalid_value(field, id, "Id cannot end with a space"));
    }
    if let Some(c) = id.chars().find(|c| FORBIDDEN_ID_CHARS.contains(c)) {
        return Err(ConfigError::invalid_value(
            field,
            id,
            format!("Id cannot contain '{}'", c),
        ));
    }
    Ok(())
}
