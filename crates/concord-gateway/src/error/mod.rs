//! Gateway error types

use crate::protocol::CloseCode;
use crate::transport::TransportError;
use thiserror::Error;

/// Gateway error type
///
/// Recoverable conditions (reconnectable closes, dropped sockets after a
/// successful handshake) never surface here; the supervisor absorbs them.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The initial connection could not be established
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server closed with a code classified as fatal
    #[error("Fatal close code: {0}")]
    FatalClose(CloseCode),

    /// The handshake did not complete
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// An operation that needs an active connection was called without one
    #[error("Not connected")]
    NotConnected,
}
