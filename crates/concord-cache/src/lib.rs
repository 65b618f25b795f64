//! # concord-cache
//!
//! Client-side caching: the bounded TTL cache for hot short-lived objects
//! (messages) and the ID-keyed state arena (guilds/users/channels) that the
//! event dispatcher keeps current.

pub mod bounded;
pub mod state;

pub use bounded::BoundedCache;
pub use state::CacheState;
