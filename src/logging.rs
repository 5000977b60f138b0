// src/logging.rs

//! Logger setup for the binary.
//!
//! The configured level is only a default: `RUST_LOG` wins when it is set.

use crate::config::LoggingConfig;

/// Installs the global logger at the configured level.
///
/// Returns `false` if a logger was already installed (for instance by a test
/// harness); the existing logger is kept.
#[cfg(feature = "logging")]
pub fn init(config: &LoggingConfig) -> bool {
    let filter: log::LevelFilter = config.level.into();
    let env = env_logger::Env::default().default_filter_or(filter.as_str().to_lowercase());
    match env_logger::Builder::from_env(env).format_timestamp_millis().try_init() {
        Ok(()) => {
            log::debug!("Logger initialised at {}", config.level);
            true
        }
        Err(_) => false,
    }
}

/// Without the `logging` feature only the `log` facade's max level is set.
#[cfg(not(feature = "logging"))]
pub fn init(config: &LoggingConfig) -> bool {
    log::set_max_level(config.level.into());
    false
}
