//! Ready barrier
//!
//! Reconciles the asynchronous burst of guild-create and member-chunk events
//! that follows the initial ready payload into a single convergence point.
//! One barrier exists per identify cycle; it is consumed when ready fires.

use concord_core::{ReadyEvent, Snowflake};
use std::collections::HashMap;

/// Progress of one guild's member chunks
#[derive(Debug, Clone, Copy, Default)]
struct ChunkProgress {
    /// Chunks received so far
    received: u32,
    /// Total chunks the server will send; unknown until the first arrives
    expected: Option<u32>,
}

impl ChunkProgress {
    fn is_complete(self) -> bool {
        self.expected.is_some_and(|expected| self.received >= expected)
    }
}

/// Convergence gate for the initial synchronization burst
#[derive(Debug)]
pub struct ReadyBarrier {
    expected_guilds: usize,
    created_guilds: usize,
    chunks: HashMap<Snowflake, ChunkProgress>,
    ready: Box<ReadyEvent>,
}

impl ReadyBarrier {
    /// Create a barrier from the ready payload's guild stub list
    #[must_use]
    pub fn new(ready: Box<ReadyEvent>) -> Self {
        Self {
            expected_guilds: ready.guilds.len(),
            created_guilds: 0,
            chunks: HashMap::new(),
            ready,
        }
    }

    /// Record a guild-create event
    pub fn note_guild_created(&mut self) {
        self.created_guilds += 1;
    }

    /// Track a guild whose member chunks were just requested
    ///
    /// Registered before the first chunk arrives so the barrier cannot
    /// converge in the window between request and response.
    pub fn note_chunks_requested(&mut self, guild_id: Snowflake) {
        self.chunks.entry(guild_id).or_default();
    }

    /// Record one received member chunk for a guild
    pub fn note_chunk_received(&mut self, guild_id: Snowflake, chunk_count: u32) {
        let progress = self.chunks.entry(guild_id).or_default();
        progress.received += 1;
        progress.expected = Some(chunk_count);
    }

    /// Whether every expected guild has arrived and every tracked guild's
    /// chunks are complete
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.created_guilds >= self.expected_guilds
            && self.chunks.values().all(|progress| progress.is_complete())
    }

    /// Consume the barrier, discarding per-guild chunk state and yielding
    /// the payload for the ready event
    #[must_use]
    pub fn into_ready(self) -> Box<ReadyEvent> {
        self.ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_with_guilds(count: usize) -> Box<ReadyEvent> {
        let guilds: Vec<serde_json::Value> = (0..count)
            .map(|i| serde_json::json!({"id": (i + 1).to_string(), "unavailable": true}))
            .collect();
        serde_json::from_value(serde_json::json!({
            "user": {"id": "1", "username": "echo"},
            "session_id": "abc",
            "guilds": guilds,
        }))
        .map(Box::new)
        .unwrap()
    }

    #[test]
    fn test_completes_when_all_guilds_created() {
        let mut barrier = ReadyBarrier::new(ready_with_guilds(3));
        assert!(!barrier.is_complete());

        barrier.note_guild_created();
        barrier.note_guild_created();
        // Two of three: not yet
        assert!(!barrier.is_complete());

        barrier.note_guild_created();
        assert!(barrier.is_complete());
    }

    #[test]
    fn test_zero_guilds_is_immediately_complete() {
        let barrier = ReadyBarrier::new(ready_with_guilds(0));
        assert!(barrier.is_complete());
    }

    #[test]
    fn test_requested_chunks_hold_the_barrier_open() {
        let mut barrier = ReadyBarrier::new(ready_with_guilds(1));
        barrier.note_guild_created();
        barrier.note_chunks_requested(Snowflake::new(1));

        // All guilds created, but the requested chunks have not arrived
        assert!(!barrier.is_complete());

        barrier.note_chunk_received(Snowflake::new(1), 2);
        assert!(!barrier.is_complete());

        barrier.note_chunk_received(Snowflake::new(1), 2);
        assert!(barrier.is_complete());
    }

    #[test]
    fn test_multiple_guilds_all_chunks_required() {
        let mut barrier = ReadyBarrier::new(ready_with_guilds(2));
        for id in [1, 2] {
            barrier.note_guild_created();
            barrier.note_chunks_requested(Snowflake::new(id));
        }

        barrier.note_chunk_received(Snowflake::new(1), 1);
        assert!(!barrier.is_complete());

        barrier.note_chunk_received(Snowflake::new(2), 1);
        assert!(barrier.is_complete());
    }

    #[test]
    fn test_into_ready_returns_the_payload() {
        let barrier = ReadyBarrier::new(ready_with_guilds(0));
        let ready = barrier.into_ready();
        assert_eq!(ready.session_id, "abc");
    }
}
