//! # concord-gateway
//!
//! The persistent push-protocol side of the SDK: a supervised WebSocket
//! connection (handshake, heartbeat, resume/reconnect, close-code
//! classification) feeding an event dispatcher that keeps the cache current
//! and fans decoded events out to listeners, gated by the one-shot ready
//! barrier.

pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod session;
pub mod shard;
pub mod transport;

// Re-export commonly used types at crate root
pub use dispatch::{EventDispatcher, EventListener, RawDispatch, ReadyBarrier};
pub use error::GatewayError;
pub use protocol::{CloseCode, GatewayFrame, OpCode};
pub use session::{Sequence, Session};
pub use shard::{ConnectionStage, Shard};
pub use transport::{GatewayConnection, GatewayTransport, SocketEvent, WebSocketTransport};
