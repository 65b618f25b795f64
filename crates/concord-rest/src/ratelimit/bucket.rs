//! Per-route quota bucket

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// Server-declared quota shared by every call on one bucket key
#[derive(Debug, Clone, Copy)]
pub struct Bucket {
    /// Calls allowed per window
    pub limit: u32,
    /// Calls left in the current window
    pub remaining: u32,
    /// When the window rolls over
    pub reset_at: Instant,
}

impl Bucket {
    /// Whether a call on this bucket must wait
    #[must_use]
    pub fn is_exhausted(&self, now: Instant) -> bool {
        self.remaining == 0 && now < self.reset_at
    }

    /// Time left until the window rolls over
    #[must_use]
    pub fn delay_until_reset(&self, now: Instant) -> Duration {
        self.reset_at.saturating_duration_since(now)
    }
}

/// Quota headers parsed from a response
#[derive(Debug, Clone, Copy)]
pub struct RatelimitHeaders {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: Instant,
}

impl RatelimitHeaders {
    pub const LIMIT: &'static str = "x-ratelimit-limit";
    pub const REMAINING: &'static str = "x-ratelimit-remaining";
    pub const RESET: &'static str = "x-ratelimit-reset";

    /// Parse the quota headers, if the full set is present
    ///
    /// `x-ratelimit-reset` is a fractional Unix timestamp in seconds; it is
    /// mapped onto the monotonic clock relative to now.
    #[must_use]
    pub fn parse(headers: &HashMap<String, String>) -> Option<Self> {
        let limit = headers.get(Self::LIMIT)?.parse().ok()?;
        let remaining = headers.get(Self::REMAINING)?.parse().ok()?;
        let reset: f64 = headers.get(Self::RESET)?.parse().ok()?;

        let now_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        let until_reset = (reset - now_unix).max(0.0);

        Some(Self {
            limit,
            remaining,
            reset_at: Instant::now() + Duration::from_secs_f64(until_reset),
        })
    }
}

impl From<RatelimitHeaders> for Bucket {
    fn from(headers: RatelimitHeaders) -> Self {
        Self {
            limit: headers.limit,
            remaining: headers.remaining,
            reset_at: headers.reset_at,
        }
    }
}
