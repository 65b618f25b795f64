//! Gateway transport seam
//!
//! The supervisor drives the socket through [`GatewayTransport`]: connecting
//! yields a pair of channels, outbound frames in one direction and decoded
//! socket events in the other. Production bridges them onto a WebSocket;
//! tests script them directly.

mod websocket;

pub use websocket::WebSocketTransport;

use crate::protocol::GatewayFrame;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Channel buffer size for frames in either direction
pub const FRAME_BUFFER_SIZE: usize = 100;

/// Something that happened on the socket
#[derive(Debug)]
pub enum SocketEvent {
    /// A decoded inbound frame
    Frame(GatewayFrame),
    /// The socket closed, with the close code when one was received
    Closed(Option<u16>),
}

/// One live connection: frames out, events in
///
/// Dropping both ends tears the underlying socket down.
pub struct GatewayConnection {
    /// Frames to write to the socket
    pub outbound: mpsc::Sender<GatewayFrame>,
    /// Frames and closure read from the socket
    pub inbound: mpsc::Receiver<SocketEvent>,
}

/// Failure to establish a connection
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to connect: {0}")]
    Connect(#[source] anyhow::Error),
}

/// Transport for the persistent push connection
#[async_trait]
pub trait GatewayTransport: Send + Sync + 'static {
    /// Open a connection to the given URL
    async fn connect(&self, url: &str) -> Result<GatewayConnection, TransportError>;
}
