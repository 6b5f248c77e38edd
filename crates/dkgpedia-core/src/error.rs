//! Centralized error types for DKGPedia.

use thiserror::Error;

/// Main error type for DKGPedia operations.
#[derive(Error, Debug)]
pub enum DkgError {
    #[error("{service} returned HTTP {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} is unreachable: {message}")]
    Unreachable {
        service: &'static str,
        message: String,
    },

    #[error("{0} request timed out")]
    Timeout(&'static str),

    #[error("Payment was not accepted by the knowledge graph")]
    PaymentRejected,

    #[error("Payment error: {0}")]
    Payment(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for DKGPedia operations.
pub type DkgResult<T> = Result<T, DkgError>;

impl DkgError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a payment error.
    pub fn payment(msg: impl Into<String>) -> Self {
        Self::Payment(msg.into())
    }

    /// Create an unreachable-service error.
    pub fn unreachable(service: &'static str, msg: impl Into<String>) -> Self {
        Self::Unreachable {
            service,
            message: msg.into(),
        }
    }

    /// HTTP status of the upstream response, if this error carries one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
