//! Executor error types
//!
//! HTTP status failures map 1:1 onto typed variants. Throttling (429) is
//! never surfaced here — the executor absorbs it as a delay; only retry
//! ceiling exhaustion escapes.

use crate::transport::TransportError;

/// Executor error type
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// 400
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 401
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 405
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// 502
    #[error("Gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// Any other non-success status
    #[error("Unexpected status {status}: {message}")]
    Unknown { status: u16, message: String },

    /// Transparent 429 retries exceeded the configured ceiling
    #[error("Rate limit retries exhausted after {attempts} attempts on {route}")]
    RetryLimit { route: String, attempts: u32 },

    /// Failed to reach the server at all
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response body did not match the expected shape
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RestError {
    /// Map a non-success status code and its body message to a typed error
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => Self::BadRequest(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            405 => Self::MethodNotAllowed(message),
            502 => Self::GatewayUnavailable(message),
            _ => Self::Unknown { status, message },
        }
    }

    /// The HTTP status this error was mapped from, when applicable
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::MethodNotAllowed(_) => Some(405),
            Self::GatewayUnavailable(_) => Some(502),
            Self::Unknown { status, .. } => Some(*status),
            _ => None,
        }
    }
}
