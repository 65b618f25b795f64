//! # concord-rest
//!
//! Rate-limited REST request executor: per-route quota buckets learned from
//! response headers, transparent 429 retries, and a typed endpoint façade.

pub mod client;
pub mod error;
pub mod ratelimit;
pub mod request;
pub mod routes;
pub mod transport;

// Re-export commonly used types at crate root
pub use client::RestClient;
pub use error::RestError;
pub use ratelimit::{Bucket, RatelimitHeaders, Ratelimiter};
pub use request::{AttachmentUpload, CreateMessage, EditMessage, Method, Request, Response};
pub use routes::{RatelimitPolicy, Route};
pub use transport::{HttpTransport, ReqwestTransport, TransportError};
