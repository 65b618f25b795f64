//! Rate-limited request executor and endpoint façade
//!
//! `execute` is the single funnel every call goes through: bucket wait,
//! send, bucket update, transparent 429 retry, status classification.
//! The endpoint methods below it are thin, mechanical bindings — they
//! assemble a route and body and decode the typed result.

use crate::error::RestError;
use crate::ratelimit::{RatelimitHeaders, Ratelimiter};
use crate::request::{AttachmentUpload, CreateMessage, EditMessage, Request, Response};
use crate::routes::{RatelimitPolicy, Route};
use crate::transport::{HttpTransport, ReqwestTransport};
use concord_common::ClientConfig;
use concord_core::{Channel, Guild, Member, Message, Snowflake, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Body shape of a 429 response
#[derive(Debug, serde::Deserialize)]
struct ThrottleBody {
    /// Seconds to wait, fractional
    retry_after: f64,
}

/// Rate-limited API client
pub struct RestClient {
    transport: Arc<dyn HttpTransport>,
    ratelimiter: Ratelimiter,
    retry_limit: u32,
}

impl RestClient {
    /// Build a client over the production reqwest transport
    pub fn new(config: &ClientConfig) -> Result<Self, RestError> {
        let transport =
            ReqwestTransport::new(&config.api_url, &config.token, &config.user_agent)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            config.request_retry_limit,
        ))
    }

    /// Build a client over any transport (tests use scripted ones)
    #[must_use]
    pub fn with_transport(transport: Arc<dyn HttpTransport>, retry_limit: u32) -> Self {
        Self {
            transport,
            ratelimiter: Ratelimiter::new(),
            retry_limit,
        }
    }

    /// Execute a request, transparently absorbing throttling
    ///
    /// Waits out the route's bucket before sending, updates the bucket from
    /// response headers after, and re-issues the identical request on 429
    /// after sleeping the server-provided `retry_after`. Throttling is never
    /// surfaced as a failure; only exceeding the retry ceiling is.
    pub async fn execute(&self, request: Request) -> Result<Response, RestError> {
        let bucket_key = request.route.bucket().to_string();
        let policy = request.route.policy();
        let mut attempts: u32 = 0;

        loop {
            self.ratelimiter.acquire(&bucket_key).await;

            let response = self.transport.send(&request).await?;

            match policy {
                RatelimitPolicy::SharedBucket => {
                    if let Some(headers) = RatelimitHeaders::parse(&response.headers) {
                        self.ratelimiter.update(&bucket_key, headers);
                    }
                }
                RatelimitPolicy::FixedDelay(delay) => {
                    self.ratelimiter.note_delay(&bucket_key, delay);
                }
            }

            if response.status == 429 {
                let retry_after = match response.json::<ThrottleBody>() {
                    Ok(body) => body.retry_after,
                    Err(_) => {
                        tracing::warn!(route = %request.route, "429 without retry_after body");
                        1.0
                    }
                };

                attempts += 1;
                if attempts > self.retry_limit {
                    return Err(RestError::RetryLimit {
                        route: request.route.to_string(),
                        attempts,
                    });
                }

                tracing::debug!(
                    route = %request.route,
                    retry_after_secs = retry_after,
                    attempt = attempts,
                    "Throttled, retrying after delay"
                );
                tokio::time::sleep(Duration::from_secs_f64(retry_after)).await;
                continue;
            }

            if !response.is_success() {
                let status = response.status;
                return Err(RestError::from_status(status, api_message(&response.body)));
            }

            return Ok(response);
        }
    }

    /// Execute and decode a JSON response body
    async fn fire<T: DeserializeOwned>(&self, request: Request) -> Result<T, RestError> {
        let response = self.execute(request).await?;
        response.json().map_err(RestError::Decode)
    }

    /// Execute a call whose success response carries no body
    async fn fire_empty(&self, request: Request) -> Result<(), RestError> {
        self.execute(request).await.map(|_| ())
    }

    // === Users ===

    /// Fetch the authenticated user
    pub async fn current_user(&self) -> Result<User, RestError> {
        self.fire(Request::new(Route::current_user())).await
    }

    /// Fetch a user by ID
    pub async fn user(&self, user_id: Snowflake) -> Result<User, RestError> {
        self.fire(Request::new(Route::user(user_id))).await
    }

    /// Open (or fetch the existing) DM channel with a user
    pub async fn create_dm(&self, recipient_id: Snowflake) -> Result<Channel, RestError> {
        #[derive(Serialize)]
        struct Body {
            recipient_id: Snowflake,
        }
        self.fire(Request::json(Route::create_dm(), &Body { recipient_id }))
            .await
    }

    /// Leave a guild
    pub async fn leave_guild(&self, guild_id: Snowflake) -> Result<(), RestError> {
        self.fire_empty(Request::new(Route::leave_guild(guild_id))).await
    }

    // === Guilds ===

    /// Fetch a guild by ID
    pub async fn guild(&self, guild_id: Snowflake) -> Result<Guild, RestError> {
        self.fire(Request::new(Route::guild(guild_id))).await
    }

    /// Fetch a guild's channels
    pub async fn guild_channels(&self, guild_id: Snowflake) -> Result<Vec<Channel>, RestError> {
        self.fire(Request::new(Route::guild_channels(guild_id))).await
    }

    /// List up to `limit` members of a guild
    pub async fn guild_members(
        &self,
        guild_id: Snowflake,
        limit: u16,
    ) -> Result<Vec<Member>, RestError> {
        self.fire(Request::new(Route::guild_members(guild_id, limit)))
            .await
    }

    // === Channels ===

    /// Fetch a channel by ID
    pub async fn channel(&self, channel_id: Snowflake) -> Result<Channel, RestError> {
        self.fire(Request::new(Route::channel(channel_id))).await
    }

    /// Fire the typing indicator in a channel
    pub async fn trigger_typing(&self, channel_id: Snowflake) -> Result<(), RestError> {
        self.fire_empty(Request::new(Route::trigger_typing(channel_id)))
            .await
    }

    // === Messages ===

    /// Send a message, optionally with file attachments
    pub async fn create_message(
        &self,
        channel_id: Snowflake,
        message: &CreateMessage,
        attachments: Vec<AttachmentUpload>,
    ) -> Result<Message, RestError> {
        let request =
            Request::json(Route::create_message(channel_id), message).with_attachments(attachments);
        self.fire(request).await
    }

    /// Edit a previously sent message
    pub async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        edit: &EditMessage,
    ) -> Result<Message, RestError> {
        self.fire(Request::json(Route::edit_message(channel_id, message_id), edit))
            .await
    }

    /// Delete a message
    pub async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<(), RestError> {
        self.fire_empty(Request::new(Route::delete_message(channel_id, message_id)))
            .await
    }

    // === Reactions ===

    /// Add a reaction on behalf of the current user
    pub async fn create_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> Result<(), RestError> {
        self.fire_empty(Request::new(Route::create_reaction(channel_id, message_id, emoji)))
            .await
    }

    /// Remove the current user's reaction
    pub async fn delete_own_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> Result<(), RestError> {
        self.fire_empty(Request::new(Route::delete_own_reaction(
            channel_id, message_id, emoji,
        )))
        .await
    }
}

/// Pull a human-readable message out of an error body
fn api_message(body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ApiError {
        message: String,
    }
    if let Ok(err) = serde_json::from_slice::<ApiError>(body) {
        return err.message;
    }
    String::from_utf8_lossy(body).chars().take(256).collect()
}
