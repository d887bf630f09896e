//! Error handling module for the scheduling library.
//!
//! Provides one error type for everything that talks to the record store,
//! plus the form-level error returned to the appointment modal.

use std::collections::BTreeMap;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
    pub const REMOTE_ERROR: &str = "REMOTE_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
}

/// Application error type.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Missing or malformed configuration
    Config(String),
    /// Network failure talking to the record store
    Transport(String),
    /// The record store answered but reported failure
    Remote(String),
    /// The record store answered with a payload we could not read
    Decode(String),
    /// Record not found
    NotFound(String),
}

impl AppError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => codes::CONFIG_ERROR,
            AppError::Transport(_) => codes::TRANSPORT_ERROR,
            AppError::Remote(_) => codes::REMOTE_ERROR,
            AppError::Decode(_) => codes::DECODE_ERROR,
            AppError::NotFound(_) => codes::NOT_FOUND,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            AppError::Config(msg)
            | AppError::Transport(msg)
            | AppError::Remote(msg)
            | AppError::Decode(msg)
            | AppError::NotFound(msg) => msg,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Record store transport error: {:?}", err);
        if err.is_decode() {
            AppError::Decode(format!("Invalid record store payload: {}", err))
        } else {
            AppError::Transport(format!("Record store unreachable: {}", err))
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Decode(format!("JSON error: {}", err))
    }
}

/// Form field an error message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Title,
    Patient,
    Doctor,
    DateTime,
}

/// Field-level validation messages, at most one per field.
pub type FieldErrors = BTreeMap<FormField, String>;

/// Why an appointment form submission did not go through.
///
/// Every variant leaves the entered data in place so the user can retry.
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    /// One or more fields failed validation; nothing was sent.
    Validation(FieldErrors),
    /// The slot overlaps another appointment on the same day.
    Conflict,
    /// The record store did not accept the write.
    Store(String),
}

impl FormError {
    /// Message suitable for a toast notification.
    pub fn user_message(&self) -> String {
        match self {
            FormError::Validation(errors) => {
                let messages: Vec<&str> = errors.values().map(String::as_str).collect();
                messages.join("; ")
            }
            FormError::Conflict => {
                "This time slot conflicts with an existing appointment".to_string()
            }
            FormError::Store(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for FormError {}
