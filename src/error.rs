// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for the Maestro worker orchestrator.
//!
//! Each layer gets its own `thiserror` enum: the remote session client,
//! the coordination store, the orchestrator that sits on top of both, and
//! configuration loading. The binary uses `anyhow` for propagation.

use thiserror::Error;

/// Errors raised by a [`SessionClient`](crate::remote::SessionClient).
///
/// Transport failures are normalized into this small set of kinds at the
/// client boundary so callers never look at raw HTTP responses.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Service unavailable (HTTP {status}): {message}")]
    ServiceUnavailable { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request failed (HTTP {status}): {body}")]
    Request { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Response decoding error: {0}")]
    Decode(String),

    #[error("Session created but no session id was returned")]
    MissingSessionId,
}

impl RemoteError {
    /// Create a request error from a status code and response body.
    pub fn request(status: u16, body: impl Into<String>) -> Self {
        Self::Request {
            status,
            body: body.into(),
        }
    }

    /// Check if this error is transient.
    ///
    /// Session creation retries every failure regardless; this is used to
    /// pick the log level for a failed attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::ServiceUnavailable { .. } | Self::Network(_)
        )
    }

    /// HTTP status associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Auth(_) => Some(401),
            Self::RateLimited(_) => Some(429),
            Self::NotFound(_) => Some(404),
            Self::ServiceUnavailable { status, .. } | Self::Request { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) | Self::MissingSessionId => None,
        }
    }
}

/// Precondition violations in the branch namespace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinationError {
    #[error("Branch '{0}' already exists")]
    BranchExists(String),

    #[error("Base branch '{0}' does not exist")]
    BaseBranchMissing(String),

    #[error("Branch '{0}' does not exist")]
    BranchNotFound(String),

    #[error("Cannot delete '{0}' branch")]
    ProtectedBranch(String),
}

/// Errors surfaced by the [`WorkerOrchestrator`](crate::orchestrate::WorkerOrchestrator).
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Worker not found: {0}")]
    WorkerNotFound(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Failed to create session after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: RemoteError,
    },

    #[error(transparent)]
    Coordination(#[from] CoordinationError),
}

impl OrchestratorError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_retryable() {
        assert!(RemoteError::RateLimited("slow down".to_string()).is_retryable());
        assert!(RemoteError::Network("connection refused".to_string()).is_retryable());
        assert!(RemoteError::ServiceUnavailable {
            status: 503,
            message: "down".to_string()
        }
        .is_retryable());
        assert!(!RemoteError::Auth("bad key".to_string()).is_retryable());
        assert!(!RemoteError::request(400, "bad").is_retryable());
        assert!(!RemoteError::MissingSessionId.is_retryable());
    }

    #[test]
    fn test_remote_error_status_code() {
        assert_eq!(RemoteError::request(422, "nope").status_code(), Some(422));
        assert_eq!(RemoteError::NotFound("s".to_string()).status_code(), Some(404));
        assert_eq!(RemoteError::Network("x".to_string()).status_code(), None);
    }

    #[test]
    fn test_orchestrator_error_from_remote() {
        let err: OrchestratorError = RemoteError::Auth("invalid".to_string()).into();
        assert!(matches!(err, OrchestratorError::Remote(RemoteError::Auth(_))));
    }

    #[test]
    fn test_retries_exhausted_display() {
        let err = OrchestratorError::RetriesExhausted {
            attempts: 3,
            last: RemoteError::Network("timeout".to_string()),
        };
        let display = err.to_string();
        assert!(display.contains("after 3 attempts"));
        assert!(display.contains("timeout"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_coordination_error_display() {
        let err = CoordinationError::ProtectedBranch("main".to_string());
        assert_eq!(err.to_string(), "Cannot delete 'main' branch");
    }

    #[test]
    fn test_config_error_from_json() {
        let result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid json");
        let config_err: ConfigError = result.unwrap_err().into();
        assert!(matches!(config_err, ConfigError::JsonError(_)));
    }
}
