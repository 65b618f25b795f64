//! Rate limiter
//!
//! Tracks one [`Bucket`] per route key. Buckets are created lazily from the
//! first response carrying quota headers; before that, calls go straight
//! through. Waiting happens here, never in the caller's error path.

mod bucket;

pub use bucket::{Bucket, RatelimitHeaders};

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Per-route-key quota table
#[derive(Debug, Default)]
pub struct Ratelimiter {
    buckets: DashMap<String, Bucket>,
}

impl Ratelimiter {
    /// Create an empty bucket table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until a call on `key` is allowed, then consume one slot
    ///
    /// Sends immediately when no bucket is recorded, the bucket has calls
    /// remaining, or its reset time has passed.
    pub async fn acquire(&self, key: &str) {
        loop {
            let delay = {
                match self.buckets.get_mut(key) {
                    None => None,
                    Some(mut bucket) => {
                        let now = Instant::now();
                        if now >= bucket.reset_at {
                            // Window rolled over while we were not looking
                            bucket.remaining = bucket.limit.max(1);
                        }
                        if bucket.remaining > 0 {
                            bucket.remaining -= 1;
                            None
                        } else {
                            Some(bucket.delay_until_reset(now))
                        }
                    }
                }
            };

            match delay {
                None => return,
                Some(delay) => {
                    tracing::debug!(
                        bucket = key,
                        delay_ms = delay.as_millis() as u64,
                        "Bucket exhausted, waiting for reset"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Record the quota a response declared for `key`
    pub fn update(&self, key: &str, headers: RatelimitHeaders) {
        tracing::trace!(
            bucket = key,
            limit = headers.limit,
            remaining = headers.remaining,
            "Updating bucket from response headers"
        );
        self.buckets.insert(key.to_string(), headers.into());
    }

    /// Block the next call on `key` until `delay` has elapsed
    ///
    /// Used by fixed-delay routes: the pause is recorded as an exhausted
    /// one-slot bucket so the next acquire on the key waits it out.
    pub fn note_delay(&self, key: &str, delay: Duration) {
        self.buckets.insert(
            key.to_string(),
            Bucket {
                limit: 1,
                remaining: 0,
                reset_at: Instant::now() + delay,
            },
        );
    }

    /// Number of tracked buckets
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether any bucket has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
