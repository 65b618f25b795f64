//! Heartbeat task
//!
//! One independent task per connection: sleep the server-specified interval,
//! send a heartbeat carrying the last known sequence. Out-of-band heartbeats
//! (server op 1 requests) are sent by the read loop directly and do not
//! disturb this timer.

use crate::protocol::GatewayFrame;
use crate::session::Sequence;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

/// Periodic heartbeat loop for one connection
pub(crate) struct Heartbeater {
    interval: Duration,
    outbound: mpsc::Sender<GatewayFrame>,
    sequence: Arc<Sequence>,
    /// Set by the read loop when an ACK (op 11) arrives
    acked: Arc<AtomicBool>,
    /// Notified when the connection is declared dead
    zombie: Arc<Notify>,
}

impl Heartbeater {
    pub(crate) fn new(
        interval_ms: u64,
        outbound: mpsc::Sender<GatewayFrame>,
        sequence: Arc<Sequence>,
        acked: Arc<AtomicBool>,
        zombie: Arc<Notify>,
    ) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            outbound,
            sequence,
            acked,
            zombie,
        }
    }

    /// Run until the connection dies or a heartbeat goes unacknowledged
    pub(crate) async fn run(self) {
        loop {
            tokio::time::sleep(self.interval).await;

            // The previous heartbeat was never ACKed: the connection is
            // zombied, tear it down for a reconnect
            if !self.acked.swap(false, Ordering::SeqCst) {
                tracing::warn!("Heartbeat not acknowledged within one interval");
                self.zombie.notify_waiters();
                return;
            }

            let frame = GatewayFrame::heartbeat(self.sequence.get());
            tracing::trace!(sequence = ?self.sequence.get(), "Sending heartbeat");
            if self.outbound.send(frame).await.is_err() {
                // Connection torn down; nothing left to do
                return;
            }
        }
    }
}
