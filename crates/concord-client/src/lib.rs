//! # concord-client
//!
//! Top-level SDK façade: [`Client`] wires configuration, the state cache,
//! the rate-limited REST executor, and the supervised gateway connection
//! into one object.
//!
//! ```no_run
//! use concord_client::{Client, EventListener};
//! use concord_core::{Event, Intents};
//! use std::sync::Arc;
//!
//! struct Logger;
//!
//! #[async_trait::async_trait]
//! impl EventListener for Logger {
//!     async fn on_event(&self, event: Event) {
//!         println!("event: {:?}", event.kind());
//!     }
//! }
//!
//! # async fn run() -> Result<(), concord_client::ClientError> {
//! let client = Client::builder("my-token")
//!     .intents(Intents::GUILDS | Intents::GUILD_MESSAGES)
//!     .listener(Arc::new(Logger))
//!     .build()?;
//!
//! // Blocks until a fatal condition or an explicit disconnect
//! client.connect().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;

pub use client::{Client, ClientBuilder};
pub use error::ClientError;

// The surface an application needs, re-exported in one place
pub use concord_cache::CacheState;
pub use concord_common::{ClientConfig, ConfigError};
pub use concord_core as core;
pub use concord_gateway::{ConnectionStage, EventListener, GatewayError, RawDispatch};
pub use concord_rest::{RestClient, RestError};
