//! Event listener trait

use async_trait::async_trait;
use concord_core::Event;
use serde_json::Value;

/// A dispatch frame exactly as received, payload untouched
#[derive(Debug, Clone)]
pub struct RawDispatch {
    /// Wire name of the event (`t` field)
    pub event: String,
    /// Sequence number (`s` field)
    pub sequence: Option<u64>,
    /// Payload (`d` field)
    pub data: Value,
}

/// Receives events from the dispatcher
///
/// Both callbacks run as spawned fire-and-forget tasks, one per
/// (event, listener) pair: the dispatcher does not wait for listeners before
/// processing the next frame, and no ordering is guaranteed between listener
/// tasks - including across successive events for the same listener. Cached
/// state read inside a callback is a snapshot that later dispatches may have
/// already superseded.
#[async_trait]
pub trait EventListener: Send + Sync + 'static {
    /// Called with each decoded event
    async fn on_event(&self, event: Event) {
        let _ = event;
    }

    /// Called with every dispatch frame, decoded or not
    ///
    /// Fires even when the typed decode fails or the event name is unknown,
    /// so no event is ever silently lost.
    async fn on_raw(&self, raw: RawDispatch) {
        let _ = raw;
    }
}
