//! Resumable session state

use std::sync::atomic::{AtomicU64, Ordering};

/// Resumable session context captured from the ready payload
///
/// Together with the last observed sequence number this is everything a
/// Resume frame needs. Invalidated (dropped) on a non-resumable disconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Server-assigned session ID
    pub id: String,
    /// Preferred URL for resuming, when the server announced one
    pub resume_url: Option<String>,
}

/// Last observed dispatch sequence, shared between the read loop and the
/// heartbeat task
///
/// Zero is the "nothing received yet" sentinel; real sequences start at 1.
/// The value only ever moves forward while a session is valid.
#[derive(Debug, Default)]
pub struct Sequence(AtomicU64);

impl Sequence {
    /// Create a tracker with no sequence observed
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed sequence; lower values are ignored
    pub fn observe(&self, seq: u64) {
        self.0.fetch_max(seq, Ordering::SeqCst);
    }

    /// The last observed sequence, if any
    pub fn get(&self) -> Option<u64> {
        match self.0.load(Ordering::SeqCst) {
            0 => None,
            seq => Some(seq),
        }
    }

    /// Forget the sequence (on session invalidation)
    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_starts_empty() {
        let seq = Sequence::new();
        assert_eq!(seq.get(), None);
    }

    #[test]
    fn test_sequence_is_monotonic() {
        let seq = Sequence::new();
        seq.observe(5);
        assert_eq!(seq.get(), Some(5));

        // A late, lower sequence never moves the counter backwards
        seq.observe(3);
        assert_eq!(seq.get(), Some(5));

        seq.observe(6);
        assert_eq!(seq.get(), Some(6));
    }

    #[test]
    fn test_sequence_reset() {
        let seq = Sequence::new();
        seq.observe(10);
        seq.reset();
        assert_eq!(seq.get(), None);
    }
}
