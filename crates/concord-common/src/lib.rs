//! # concord-common
//!
//! Shared utilities: client configuration and tracing/telemetry setup.

pub mod config;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{ClientConfig, ConfigError, ConnectionProperties, ShardConfig};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig, TracingError};
