//! Unified application error model for the session and access-control core.
//! This module provides a common error enum used by the credential store and
//! the session manager, along with helper constructors. Errors here are
//! recovered locally by the session manager and surfaced to callers as
//! signaled notices, never as unhandled faults.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// Malformed or missing input caught at the form/CLI boundary.
    UserInput { code: String, message: String },
    /// Generic authentication failure. Deliberately covers both unknown
    /// email and wrong password so callers cannot enumerate accounts.
    Auth { code: String, message: String },
    /// Registration collision: the email already belongs to a principal.
    Conflict { code: String, message: String },
    /// Persisted state that failed to parse. Recovered as anonymous.
    Corrupt { code: String, message: String },
    Io { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Corrupt { code, .. }
            | AppError::Io { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Corrupt { message, .. }
            | AppError::Io { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn conflict<S: Into<String>>(code: S, msg: S) -> Self { AppError::Conflict { code: code.into(), message: msg.into() } }
    pub fn corrupt<S: Into<String>>(code: S, msg: S) -> Self { AppError::Corrupt { code: code.into(), message: msg.into() } }
    pub fn io<S: Into<String>>(code: S, msg: S) -> Self { AppError::Io { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// True for failures that must be reported to the user with the generic
    /// invalid-credentials wording rather than their own message.
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, AppError::Auth { .. } | AppError::Io { .. } | AppError::Internal { .. })
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Default mapping: treat as Io unless constructed more precisely
        AppError::Io { code: "storage_error".into(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_and_display() {
        let e = AppError::conflict("email_taken", "already exists");
        assert_eq!(e.code_str(), "email_taken");
        assert_eq!(e.message(), "already exists");
        assert_eq!(e.to_string(), "email_taken: already exists");
    }

    #[test]
    fn credential_failure_classification() {
        assert!(AppError::auth("invalid_credentials", "no").is_credential_failure());
        assert!(AppError::io("storage_error", "disk").is_credential_failure());
        assert!(!AppError::conflict("email_taken", "dup").is_credential_failure());
        assert!(!AppError::corrupt("bad_session", "parse").is_credential_failure());
    }

    #[test]
    fn anyhow_maps_to_io() {
        let e: AppError = anyhow::anyhow!("boom").into();
        assert!(matches!(e, AppError::Io { .. }));
        assert_eq!(e.message(), "boom");
    }
}
