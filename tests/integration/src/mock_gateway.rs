//! Scripted mock gateway server
//!
//! Binds a local TCP port and speaks the gateway protocol over real
//! WebSockets, one accepted connection at a time, under full control of the
//! test.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

/// A listening mock gateway
pub struct MockGateway {
    listener: TcpListener,
    addr: SocketAddr,
}

impl MockGateway {
    /// Bind to an ephemeral local port
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock gateway");
        let addr = listener.local_addr().expect("no local addr");
        Self { listener, addr }
    }

    /// The ws:// URL clients should connect to
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Accept the next client connection
    pub async fn accept(&self) -> GatewayPeer {
        let (stream, _) = self.listener.accept().await.expect("accept failed");
        let ws = accept_async(stream).await.expect("websocket handshake failed");
        GatewayPeer { ws }
    }
}

/// The server side of one accepted connection
pub struct GatewayPeer {
    ws: WebSocketStream<TcpStream>,
}

impl GatewayPeer {
    /// Send a raw JSON frame
    pub async fn send_json(&mut self, value: Value) {
        self.ws
            .send(Message::Text(value.to_string()))
            .await
            .expect("send failed");
    }

    /// Send the hello frame (op 10)
    pub async fn send_hello(&mut self, heartbeat_interval_ms: u64) {
        self.send_json(json!({
            "op": 10,
            "d": {"heartbeat_interval": heartbeat_interval_ms},
        }))
        .await;
    }

    /// Send a dispatch frame (op 0)
    pub async fn send_dispatch(&mut self, event: &str, seq: u64, data: Value) {
        self.send_json(json!({"op": 0, "t": event, "s": seq, "d": data}))
            .await;
    }

    /// Receive the next JSON frame, skipping non-text messages
    pub async fn recv_json(&mut self) -> Value {
        loop {
            let message = self
                .ws
                .next()
                .await
                .expect("peer disconnected")
                .expect("read failed");
            if let Message::Text(text) = message {
                return serde_json::from_str(&text).expect("client sent invalid JSON");
            }
        }
    }

    /// Receive frames until one with the given op arrives
    pub async fn recv_op(&mut self, op: u64) -> Value {
        loop {
            let frame = self.recv_json().await;
            if frame["op"] == json!(op) {
                return frame;
            }
        }
    }

    /// Close the connection with a gateway close code
    pub async fn close_with(mut self, code: u16) {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: "".into(),
        };
        let _ = self.ws.send(Message::Close(Some(frame))).await;
        // Drain until the client acknowledges the close
        while let Some(Ok(_)) = self.ws.next().await {}
    }
}
