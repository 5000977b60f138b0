//! Error types for the getting-started walkthrough
//!
//! This module defines the error types used throughout the crate. The main
//! error type is `GSError`, which covers everything from configuration and
//! serialization failures to errors reported by the document service.

use thiserror::Error;

/// Main error type for the getting-started walkthrough
#[derive(Error, Debug)]
pub enum GSError {
    /// I/O operation failed (including writes to the progress sink)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error (JSON): {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The document service answered with a non-success status
    #[error("Service error {status}: {message}")]
    Service {
        /// HTTP status code returned by the service.
        status: u16,
        /// Message reported by the SDK.
        message: String,
    },

    /// The SDK failed without a service response (transport, credentials, ...)
    #[error("Client error: {0}")]
    Client(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A resource with the same id already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failure injected by a test double
    #[error("Simulated failure: {0}")]
    Simulated(String),
}

/// Result type alias for operations that can fail with a [GSError]
pub type Result<T> = std::result::Result<T, GSError>;

impl GSError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        GSError::InvalidInput(msg.into())
    }

    /// Create a new not found error
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        GSError::NotFound(what.into())
    }

    /// Create a new conflict error
    pub fn conflict<S: Into<String>>(what: S) -> Self {
        GSError::Conflict(what.into())
    }

    /// Classifies an SDK failure by the HTTP status of the service response,
    /// if there was one.
    pub fn from_response<S: Into<String>>(status: Option<u16>, message: S) -> Self {
        let message = message.into();
        match status {
            Some(404) => GSError::NotFound(message),
            Some(409) => GSError::Conflict(message),
            Some(status) => GSError::Service { status, message },
            None => GSError::Client(message),
        }
    }

    /// HTTP-style status code for this error, when one applies.
    pub fn status(&self) -> Option<u16> {
        match self {
            GSError::Service { status, .. } => Some(*status),
            GSError::NotFound(_) => Some(404),
            GSError::Conflict(_) => Some(409),
            _ => None,
        }
    }
}

#[cfg(feature = "cosmos")]
impl From<azure_core::Error> for GSError {
    fn from(err: azure_core::Error) -> Self {
        GSError::from_response(err.http_status().map(u16::from), err.to_string())
    }
}
