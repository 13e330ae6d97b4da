//! Error types and handling
//!
//! Request outcomes such as denials, unknown credentials and actions that are
//! invalid for the door state are values carried by [`RequestResult`]. The
//! errors here cover infrastructure failures and defects only.
//!
//! [`RequestResult`]: crate::control::RequestResult

use thiserror::Error;
use tracing::{error, warn};

/// Errors that can occur while running the access-control core
#[derive(Debug, Error)]
pub enum AccessControlError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// A door id reached the registry without being resolved first
    #[error("Unknown door: {0}")]
    UnknownDoor(String),

    /// A per-door or scheduler lock was poisoned by a panicking holder
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// The clock thread could not be started or joined
    #[error("Clock error: {0}")]
    ClockError(String),

    /// A request could not be parsed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AccessControlError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create an unknown door error
    pub fn unknown_door(door_id: impl Into<String>) -> Self {
        Self::UnknownDoor(door_id.into())
    }

    /// Create a lock poisoned error
    pub fn lock_poisoned(what: impl Into<String>) -> Self {
        Self::LockPoisoned(what.into())
    }

    /// Create a clock error
    pub fn clock_error(msg: impl Into<String>) -> Self {
        Self::ClockError(msg.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            AccessControlError::ConfigurationError(_) => false,
            AccessControlError::UnknownDoor(_) => true,
            AccessControlError::LockPoisoned(_) => false,
            AccessControlError::ClockError(_) => false,
            AccessControlError::InvalidRequest(_) => true,
            AccessControlError::IoError(_) => true,
            AccessControlError::SerializationError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            AccessControlError::ConfigurationError(_) => "Configuration",
            AccessControlError::UnknownDoor(_) => "Lookup",
            AccessControlError::LockPoisoned(_) => "Defect",
            AccessControlError::ClockError(_) => "Clock",
            AccessControlError::InvalidRequest(_) => "Request",
            AccessControlError::IoError(_) => "IO",
            AccessControlError::SerializationError(_) => "Serialization",
        }
    }

    /// Log the error at a level matching its recoverability
    pub fn log(&self) {
        if self.is_recoverable() {
            warn!(category = self.category(), "Recoverable error: {}", self);
        } else {
            error!(category = self.category(), "Critical error: {}", self);
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for AccessControlError {
    fn from(error: std::sync::PoisonError<T>) -> Self {
        AccessControlError::LockPoisoned(error.to_string())
    }
}

/// Result type for access-control operations
pub type AccessControlResult<T> = Result<T, AccessControlError>;
