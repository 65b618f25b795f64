//! Dispatch payload definitions
//!
//! One struct per event whose payload is not already a plain entity.

use crate::entities::{Member, UnavailableGuild, User};
use crate::value_objects::Snowflake;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of the READY dispatch
///
/// Carries the session resume data and the guild stubs the ready barrier
/// counts against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyEvent {
    /// Gateway protocol version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,

    pub user: User,

    pub session_id: String,

    /// Preferred URL for resuming this session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_gateway_url: Option<String>,

    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<[u32; 2]>,
}

/// Payload of GUILD_DELETE (an unavailable stub, or a bare id on removal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildDeleteEvent {
    pub id: Snowflake,

    /// True when the guild went unavailable rather than the user leaving
    #[serde(default)]
    pub unavailable: bool,
}

/// Payload of MESSAGE_UPDATE (partial message)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageUpdateEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<DateTime<Utc>>,
}

/// Payload of MESSAGE_DELETE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeleteEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
}

/// Emoji reference inside reaction events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEmoji {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Snowflake>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Payload of MESSAGE_REACTION_ADD / MESSAGE_REACTION_REMOVE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,

    pub emoji: ReactionEmoji,
}

/// Payload of GUILD_MEMBER_ADD (a member plus its guild id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAddEvent {
    pub guild_id: Snowflake,

    #[serde(flatten)]
    pub member: Member,
}

/// Payload of GUILD_MEMBER_UPDATE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberUpdateEvent {
    pub guild_id: Snowflake,
    pub user: User,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Snowflake>,
}

/// Payload of GUILD_MEMBER_REMOVE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRemoveEvent {
    pub guild_id: Snowflake,
    pub user: User,
}

/// Payload of GUILD_MEMBERS_CHUNK
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildMembersChunkEvent {
    pub guild_id: Snowflake,

    #[serde(default)]
    pub members: Vec<Member>,

    pub chunk_index: u32,
    pub chunk_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// Payload of TYPING_START
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingStartEvent {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,

    /// Unix timestamp (seconds) of when typing started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}
