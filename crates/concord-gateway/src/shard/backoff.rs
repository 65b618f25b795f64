//! Reconnect backoff
//!
//! Exponential delay with jitter between reconnect attempts, reset once a
//! connection is established again.

use rand::Rng;
use std::time::Duration;

/// Base delay for the first reconnect attempt
const BASE_DELAY_SECS: u64 = 1;

/// Ceiling on the exponential delay
const MAX_DELAY_SECS: u64 = 64;

/// Upper bound of the random jitter added to every delay
const JITTER_MS: u64 = 1000;

/// Exponential reconnect backoff with jitter
#[derive(Debug, Default)]
pub(crate) struct ReconnectBackoff {
    attempt: u32,
}

impl ReconnectBackoff {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Delay to wait before the next attempt
    pub(crate) fn next_delay(&mut self) -> Duration {
        let exp = BASE_DELAY_SECS
            .saturating_mul(1_u64 << self.attempt.min(6))
            .min(MAX_DELAY_SECS);
        self.attempt = self.attempt.saturating_add(1);

        let jitter = rand::thread_rng().gen_range(0..JITTER_MS);
        Duration::from_secs(exp) + Duration::from_millis(jitter)
    }

    /// Start over after a successful handshake
    pub(crate) fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_grow_and_cap() {
        let mut backoff = ReconnectBackoff::new();
        let first = backoff.next_delay();
        assert!(first >= Duration::from_secs(1) && first < Duration::from_secs(3));

        let second = backoff.next_delay();
        assert!(second >= Duration::from_secs(2));

        // Push far past the cap
        for _ in 0..10 {
            backoff.next_delay();
        }
        let capped = backoff.next_delay();
        assert!(capped < Duration::from_secs(MAX_DELAY_SECS + 2));
        assert!(capped >= Duration::from_secs(MAX_DELAY_SECS));
    }

    #[test]
    fn test_reset_restarts_the_ladder() {
        let mut backoff = ReconnectBackoff::new();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();

        let delay = backoff.next_delay();
        assert!(delay < Duration::from_secs(3));
    }
}
