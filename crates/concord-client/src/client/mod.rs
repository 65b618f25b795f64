//! Client façade
//!
//! Assembles the cache, dispatcher, shard, and REST executor from one
//! configuration and exposes them behind a single handle.

use crate::error::ClientError;
use concord_cache::CacheState;
use concord_common::ClientConfig;
use concord_core::{Intents, OnlineStatus, Snowflake};
use concord_gateway::{
    ConnectionStage, EventDispatcher, EventListener, Shard, WebSocketTransport,
};
use concord_rest::RestClient;
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`Client`]
pub struct ClientBuilder {
    config: ClientConfig,
    listeners: Vec<Arc<dyn EventListener>>,
}

impl ClientBuilder {
    /// Start from a token and defaults
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(token),
            listeners: Vec::new(),
        }
    }

    /// Start from a fully prepared configuration
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            listeners: Vec::new(),
        }
    }

    /// Set the gateway intents
    #[must_use]
    pub fn intents(mut self, intents: Intents) -> Self {
        self.config = self.config.with_intents(intents);
        self
    }

    /// Set the shard assignment
    #[must_use]
    pub fn shard(mut self, index: u32, count: u32) -> Self {
        self.config = self.config.with_shard(index, count);
        self
    }

    /// Set the gateway URL
    #[must_use]
    pub fn gateway_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.with_gateway_url(url);
        self
    }

    /// Set the REST API base URL
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.with_api_url(url);
        self
    }

    /// Bound the message cache
    #[must_use]
    pub fn message_cache(mut self, capacity: usize, ttl: Duration) -> Self {
        self.config = self
            .config
            .with_message_cache_capacity(capacity)
            .with_message_cache_ttl(ttl);
        self
    }

    /// Register an event listener
    #[must_use]
    pub fn listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Assemble the client
    pub fn build(self) -> Result<Client, ClientError> {
        let config = Arc::new(self.config);
        let rest = Arc::new(RestClient::new(&config)?);

        let cache = Arc::new(CacheState::new(
            config.message_cache_capacity,
            config.message_cache_ttl,
        ));

        let dispatcher = Arc::new(EventDispatcher::new(cache.clone(), config.intents));
        for listener in self.listeners {
            dispatcher.add_listener(listener);
        }

        let shard = Arc::new(Shard::new(
            config.clone(),
            Arc::new(WebSocketTransport::new()),
            dispatcher.clone(),
        ));

        Ok(Client {
            config,
            cache,
            rest,
            dispatcher,
            shard,
        })
    }
}

/// SDK entry point: one gateway session plus the REST executor and cache
pub struct Client {
    config: Arc<ClientConfig>,
    cache: Arc<CacheState>,
    rest: Arc<RestClient>,
    dispatcher: Arc<EventDispatcher>,
    shard: Arc<Shard>,
}

impl Client {
    /// Start building a client
    #[must_use]
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(token)
    }

    /// Build a client from environment variables
    pub fn from_env() -> Result<Self, ClientError> {
        let config = ClientConfig::from_env()?;
        ClientBuilder::from_config(config).build()
    }

    /// Connect and block until a fatal condition or explicit disconnect
    ///
    /// Reconnects and resumes happen transparently inside this call.
    pub async fn connect(&self) -> Result<(), ClientError> {
        tracing::info!(gateway_url = %self.config.gateway_url, "Starting gateway session");
        self.shard.run().await.map_err(ClientError::from)
    }

    /// Ask the gateway session to stop; unblocks [`connect`](Self::connect)
    pub fn disconnect(&self) {
        self.shard.disconnect();
    }

    /// Wait until the ready barrier fires for the current identify cycle
    pub async fn wait_until_ready(&self) {
        let mut ready = self.dispatcher.subscribe_ready();
        // An error means the dispatcher is gone, which only happens at drop
        let _ = ready.wait_for(|fired| *fired).await;
    }

    /// Whether ready has fired this identify cycle
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.dispatcher.is_ready()
    }

    /// Current gateway lifecycle stage
    #[must_use]
    pub fn stage(&self) -> ConnectionStage {
        self.shard.stage()
    }

    /// Update the client's presence
    pub fn update_presence(&self, status: OnlineStatus) -> Result<(), ClientError> {
        self.shard.update_presence(status).map_err(ClientError::from)
    }

    /// Request member chunks for a guild
    pub fn request_guild_members(&self, guild_id: Snowflake) -> Result<(), ClientError> {
        self.shard
            .request_guild_members(guild_id)
            .map_err(ClientError::from)
    }

    /// The rate-limited REST executor
    #[must_use]
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Read-only view of the cached domain state
    #[must_use]
    pub fn cache(&self) -> &CacheState {
        &self.cache
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("stage", &self.stage())
            .field("ready", &self.is_ready())
            .finish()
    }
}
