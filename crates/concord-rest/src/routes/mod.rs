//! API routes and their rate-limit classification
//!
//! A route owns its HTTP method, concrete path, and bucket key (method plus
//! path with major parameter — the per-call components that share a server
//! quota). Routes whose path embeds a per-call-unique component (reaction
//! emoji) cannot share a bucket and are classified `FixedDelay` instead:
//! a short post-response pause approximating the server quota.

use crate::request::Method;
use concord_core::Snowflake;
use std::time::Duration;

/// Post-response pause applied to fixed-delay routes
pub const FIXED_ROUTE_DELAY: Duration = Duration::from_millis(250);

/// How the executor spaces calls on a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatelimitPolicy {
    /// Obey the server-declared bucket learned from response headers
    SharedBucket,
    /// Pause a fixed interval after each response instead of bucket inference
    FixedDelay(Duration),
}

/// One concrete API route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    method: Method,
    path: String,
    bucket: String,
    policy: RatelimitPolicy,
}

impl Route {
    fn shared(method: Method, path: String, bucket: String) -> Self {
        Self {
            method,
            path,
            bucket,
            policy: RatelimitPolicy::SharedBucket,
        }
    }

    fn fixed_delay(method: Method, path: String, bucket: String) -> Self {
        Self {
            method,
            path,
            bucket,
            policy: RatelimitPolicy::FixedDelay(FIXED_ROUTE_DELAY),
        }
    }

    /// HTTP method
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path relative to the API base URL
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Bucket key this route shares its quota under
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Rate-limit policy for this route
    #[must_use]
    pub const fn policy(&self) -> RatelimitPolicy {
        self.policy
    }

    // === Users ===

    pub fn current_user() -> Self {
        Self::shared(Method::Get, "/users/@me".into(), "GET:/users/@me".into())
    }

    pub fn user(user_id: Snowflake) -> Self {
        Self::shared(
            Method::Get,
            format!("/users/{user_id}"),
            "GET:/users/{id}".into(),
        )
    }

    pub fn create_dm() -> Self {
        Self::shared(
            Method::Post,
            "/users/@me/channels".into(),
            "POST:/users/@me/channels".into(),
        )
    }

    pub fn leave_guild(guild_id: Snowflake) -> Self {
        Self::shared(
            Method::Delete,
            format!("/users/@me/guilds/{guild_id}"),
            "DELETE:/users/@me/guilds/{id}".into(),
        )
    }

    // === Guilds ===

    pub fn guild(guild_id: Snowflake) -> Self {
        Self::shared(
            Method::Get,
            format!("/guilds/{guild_id}"),
            format!("GET:/guilds/{guild_id}"),
        )
    }

    pub fn guild_channels(guild_id: Snowflake) -> Self {
        Self::shared(
            Method::Get,
            format!("/guilds/{guild_id}/channels"),
            format!("GET:/guilds/{guild_id}/channels"),
        )
    }

    pub fn guild_members(guild_id: Snowflake, limit: u16) -> Self {
        Self::shared(
            Method::Get,
            format!("/guilds/{guild_id}/members?limit={limit}"),
            format!("GET:/guilds/{guild_id}/members"),
        )
    }

    // === Channels ===

    pub fn channel(channel_id: Snowflake) -> Self {
        Self::shared(
            Method::Get,
            format!("/channels/{channel_id}"),
            format!("GET:/channels/{channel_id}"),
        )
    }

    pub fn trigger_typing(channel_id: Snowflake) -> Self {
        Self::shared(
            Method::Post,
            format!("/channels/{channel_id}/typing"),
            format!("POST:/channels/{channel_id}/typing"),
        )
    }

    // === Messages ===

    pub fn create_message(channel_id: Snowflake) -> Self {
        Self::shared(
            Method::Post,
            format!("/channels/{channel_id}/messages"),
            format!("POST:/channels/{channel_id}/messages"),
        )
    }

    pub fn edit_message(channel_id: Snowflake, message_id: Snowflake) -> Self {
        Self::shared(
            Method::Patch,
            format!("/channels/{channel_id}/messages/{message_id}"),
            format!("PATCH:/channels/{channel_id}/messages/{{id}}"),
        )
    }

    pub fn delete_message(channel_id: Snowflake, message_id: Snowflake) -> Self {
        Self::shared(
            Method::Delete,
            format!("/channels/{channel_id}/messages/{message_id}"),
            format!("DELETE:/channels/{channel_id}/messages/{{id}}"),
        )
    }

    // === Reactions (per-call-unique emoji component → fixed delay) ===

    pub fn create_reaction(channel_id: Snowflake, message_id: Snowflake, emoji: &str) -> Self {
        Self::fixed_delay(
            Method::Put,
            format!("/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/@me"),
            format!("PUT:/channels/{channel_id}/reactions"),
        )
    }

    pub fn delete_own_reaction(channel_id: Snowflake, message_id: Snowflake, emoji: &str) -> Self {
        Self::fixed_delay(
            Method::Delete,
            format!("/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/@me"),
            format!("DELETE:/channels/{channel_id}/reactions"),
        )
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
