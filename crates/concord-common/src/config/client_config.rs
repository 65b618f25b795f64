//! Client configuration structs
//!
//! Built programmatically with the fluent setters, or loaded from
//! environment variables.

use concord_core::Intents;
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Shard assignment for this connection, immutable for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ShardConfig {
    /// Zero-based shard index
    pub index: u32,
    /// Total shard count
    pub count: u32,
}

impl ShardConfig {
    /// The `[index, count]` pair sent in the Identify payload
    #[must_use]
    pub const fn as_pair(self) -> [u32; 2] {
        [self.index, self.count]
    }
}

/// Client properties reported in the Identify payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

impl Default for ConnectionProperties {
    fn default() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            browser: default_library_name(),
            device: default_library_name(),
        }
    }
}

/// Main client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Authentication token
    pub token: String,
    /// Gateway intents sent with Identify
    pub intents: Intents,
    /// Shard assignment, when sharding is enabled
    pub shard: Option<ShardConfig>,
    /// Client properties sent with Identify
    pub properties: ConnectionProperties,
    /// Gateway WebSocket URL
    pub gateway_url: String,
    /// REST API base URL
    pub api_url: String,
    /// User-Agent header for REST calls
    pub user_agent: String,
    /// Maximum entries in the bounded message cache
    pub message_cache_capacity: usize,
    /// Expiry applied to cached messages
    pub message_cache_ttl: Duration,
    /// Ceiling on transparent 429 retries per request
    pub request_retry_limit: u32,
    /// How long to wait for the server hello after connecting
    pub handshake_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            intents: Intents::default(),
            shard: None,
            properties: ConnectionProperties::default(),
            gateway_url: default_gateway_url(),
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            message_cache_capacity: default_message_cache_capacity(),
            message_cache_ttl: Duration::from_secs(default_message_cache_ttl_secs()),
            request_retry_limit: default_request_retry_limit(),
            handshake_timeout: Duration::from_secs(default_handshake_timeout_secs()),
        }
    }

    /// Set the gateway intents
    #[must_use]
    pub fn with_intents(mut self, intents: Intents) -> Self {
        self.intents = intents;
        self
    }

    /// Set the shard assignment
    #[must_use]
    pub fn with_shard(mut self, index: u32, count: u32) -> Self {
        self.shard = Some(ShardConfig { index, count });
        self
    }

    /// Set the gateway URL
    #[must_use]
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    /// Set the REST API base URL
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the bounded message cache capacity
    #[must_use]
    pub fn with_message_cache_capacity(mut self, capacity: usize) -> Self {
        self.message_cache_capacity = capacity;
        self
    }

    /// Set the message cache entry expiry
    #[must_use]
    pub fn with_message_cache_ttl(mut self, ttl: Duration) -> Self {
        self.message_cache_ttl = ttl;
        self
    }

    /// Set the ceiling on transparent 429 retries
    #[must_use]
    pub fn with_request_retry_limit(mut self, limit: u32) -> Self {
        self.request_retry_limit = limit;
        self
    }

    /// Set the handshake timeout
    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Reads a `.env` file when present. `CONCORD_TOKEN` is required;
    /// everything else falls back to defaults.
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let token = env::var("CONCORD_TOKEN").map_err(|_| ConfigError::MissingVar("CONCORD_TOKEN"))?;

        let shard = match (
            env::var("CONCORD_SHARD_INDEX").ok(),
            env::var("CONCORD_SHARD_COUNT").ok(),
        ) {
            (Some(index), Some(count)) => Some(ShardConfig {
                index: index
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("CONCORD_SHARD_INDEX", index))?,
                count: count
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("CONCORD_SHARD_COUNT", count))?,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteShard),
        };

        Ok(Self {
            shard,
            intents: env::var("CONCORD_INTENTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or_else(Intents::default, Intents::from_u64),
            gateway_url: env::var("CONCORD_GATEWAY_URL").unwrap_or_else(|_| default_gateway_url()),
            api_url: env::var("CONCORD_API_URL").unwrap_or_else(|_| default_api_url()),
            user_agent: env::var("CONCORD_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
            message_cache_capacity: env::var("CONCORD_MESSAGE_CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_message_cache_capacity),
            message_cache_ttl: Duration::from_secs(
                env::var("CONCORD_MESSAGE_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_message_cache_ttl_secs),
            ),
            request_retry_limit: env::var("CONCORD_REQUEST_RETRY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_request_retry_limit),
            handshake_timeout: Duration::from_secs(default_handshake_timeout_secs()),
            properties: ConnectionProperties::default(),
            token,
        })
    }
}

// Default value functions
fn default_library_name() -> String {
    "concord".to_string()
}

fn default_gateway_url() -> String {
    "ws://127.0.0.1:8081/gateway".to_string()
}

fn default_api_url() -> String {
    "http://127.0.0.1:8080/api/v1".to_string()
}

fn default_user_agent() -> String {
    format!("concord/{}", env!("CARGO_PKG_VERSION"))
}

fn default_message_cache_capacity() -> usize {
    1000
}

fn default_message_cache_ttl_secs() -> u64 {
    3600
}

fn default_request_retry_limit() -> u32 {
    10
}

fn default_handshake_timeout_secs() -> u64 {
    30
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("CONCORD_SHARD_INDEX and CONCORD_SHARD_COUNT must be set together")]
    IncompleteShard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_defaults() {
        let config = ClientConfig::new("token");
        assert_eq!(config.token, "token");
        assert_eq!(config.intents, Intents::NON_PRIVILEGED);
        assert!(config.shard.is_none());
        assert_eq!(config.message_cache_capacity, 1000);
        assert_eq!(config.request_retry_limit, 10);
    }

    #[test]
    fn test_fluent_setters() {
        let config = ClientConfig::new("token")
            .with_intents(Intents::GUILDS)
            .with_shard(1, 4)
            .with_gateway_url("ws://localhost:9000")
            .with_message_cache_capacity(2);

        assert_eq!(config.intents, Intents::GUILDS);
        assert_eq!(config.shard, Some(ShardConfig { index: 1, count: 4 }));
        assert_eq!(config.gateway_url, "ws://localhost:9000");
        assert_eq!(config.message_cache_capacity, 2);
    }

    #[test]
    fn test_shard_pair() {
        let shard = ShardConfig { index: 2, count: 8 };
        assert_eq!(shard.as_pair(), [2, 8]);
    }

    #[test]
    fn test_default_properties_use_library_name() {
        let props = ConnectionProperties::default();
        assert_eq!(props.browser, "concord");
        assert_eq!(props.device, "concord");
        assert!(!props.os.is_empty());
    }
}
