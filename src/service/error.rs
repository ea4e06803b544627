//! Command service error types

use thiserror::Error;

/// Service error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Network, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::ServerError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::InvalidRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Unknown, message)
    }
}

/// Error classification for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Network issues, timeouts
    Network,
    /// Server error (5xx)
    ServerError,
    /// Bad request (400)
    InvalidRequest,
    /// Unknown error
    Unknown,
}

impl ServiceErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceErrorKind::Network => "network",
            ServiceErrorKind::ServerError => "server_error",
            ServiceErrorKind::InvalidRequest => "invalid_request",
            ServiceErrorKind::Unknown => "unknown",
        }
    }
}
