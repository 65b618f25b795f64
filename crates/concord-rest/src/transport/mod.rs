//! HTTP transport seam
//!
//! The executor talks to the wire through [`HttpTransport`]; production uses
//! the reqwest implementation, tests substitute scripted transports.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

use crate::request::{Request, Response};
use async_trait::async_trait;

/// Failure to perform a request at the transport level
///
/// Status-code failures are not transport errors; they arrive as a
/// [`Response`] and are classified by the executor.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid transport configuration: {0}")]
    Config(String),

    #[error("request failed: {0}")]
    Request(#[source] anyhow::Error),
}

/// Transport for request/response calls
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    /// Perform one HTTP request, returning the raw status/headers/body
    async fn send(&self, request: &Request) -> Result<Response, TransportError>;
}
