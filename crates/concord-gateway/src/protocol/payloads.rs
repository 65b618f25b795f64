//! Client payload definitions
//!
//! Payload structures for the frames this client sends, plus the server
//! hello it parses during the handshake.

use concord_core::{Intents, Snowflake};
use serde::{Deserialize, Serialize};

/// Payload of op 10 (Hello)
///
/// First frame the server sends after the socket opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Client connection properties reported in Identify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

impl From<&concord_common::ConnectionProperties> for IdentifyProperties {
    fn from(props: &concord_common::ConnectionProperties) -> Self {
        Self {
            os: props.os.clone(),
            browser: props.browser.clone(),
            device: props.device.clone(),
        }
    }
}

/// Payload of op 2 (Identify)
///
/// Authenticates a fresh session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Authentication token
    pub token: String,

    /// Intent bitfield controlling which event categories are delivered
    pub intents: Intents,

    pub properties: IdentifyProperties,

    /// `[shard_index, shard_count]` when sharding is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<[u32; 2]>,
}

/// Payload of op 6 (Resume)
///
/// Re-attaches to a previous session after a recoverable disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Authentication token
    pub token: String,

    /// Session ID to resume
    pub session_id: String,

    /// Last received sequence number
    pub seq: u64,
}

/// Payload of op 3 (Presence Update)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePresencePayload {
    /// New status (online, idle, dnd, offline)
    pub status: String,
}

/// Payload of op 8 (Request Guild Members)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestGuildMembersPayload {
    pub guild_id: Snowflake,

    /// Username prefix filter; empty string matches everyone
    pub query: String,

    /// Maximum members to return; 0 means no limit
    pub limit: u32,

    /// Include presence data in the chunks
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub presences: bool,

    /// Echoed back in the resulting chunk events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl RequestGuildMembersPayload {
    /// Request every member of a guild in chunks
    #[must_use]
    pub fn all_members(guild_id: Snowflake, presences: bool) -> Self {
        Self {
            guild_id,
            query: String::new(),
            limit: 0,
            presences,
            nonce: Some(uuid::Uuid::new_v4().to_string()),
        }
    }
}
