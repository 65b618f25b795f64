//! tokio-tungstenite gateway transport

use super::{GatewayConnection, GatewayTransport, SocketEvent, TransportError, FRAME_BUFFER_SIZE};
use crate::protocol::GatewayFrame;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;

/// Production transport over a real WebSocket
///
/// Each connection spawns a writer task (outbound channel → socket) and a
/// reader task (socket → inbound channel). Both end when the socket closes
/// or the supervisor drops its channel ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    /// Create the transport
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GatewayTransport for WebSocketTransport {
    async fn connect(&self, url: &str) -> Result<GatewayConnection, TransportError> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect(e.into()))?;
        let (mut sink, mut source) = stream.split();

        let (outbound_tx, mut outbound_rx) = mpsc::channel::<GatewayFrame>(FRAME_BUFFER_SIZE);
        let (inbound_tx, inbound_rx) = mpsc::channel::<SocketEvent>(FRAME_BUFFER_SIZE);

        // Writer: drain outbound frames into the socket
        tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                match frame.to_json() {
                    Ok(json) => {
                        if let Err(e) = sink.send(Message::Text(json)).await {
                            tracing::debug!(error = %e, "WebSocket write failed");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to encode outbound frame");
                    }
                }
            }
            let _ = sink.close().await;
        });

        // Reader: decode inbound messages into socket events
        tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Text(text)) => match GatewayFrame::from_json(&text) {
                        Ok(frame) => {
                            if inbound_tx.send(SocketEvent::Frame(frame)).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            // Malformed frame: log and keep reading
                            tracing::debug!(error = %e, "Failed to parse inbound frame");
                        }
                    },
                    Ok(Message::Close(frame)) => {
                        let code = frame.map(|f| u16::from(f.code));
                        tracing::debug!(code = ?code, "WebSocket closed by server");
                        let _ = inbound_tx.send(SocketEvent::Closed(code)).await;
                        return;
                    }
                    // Pings are answered by tungstenite during the read
                    Ok(_) => {}
                    Err(e) => {
                        tracing::debug!(error = %e, "WebSocket read error");
                        let _ = inbound_tx.send(SocketEvent::Closed(None)).await;
                        return;
                    }
                }
            }
            let _ = inbound_tx.send(SocketEvent::Closed(None)).await;
        });

        Ok(GatewayConnection {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}
