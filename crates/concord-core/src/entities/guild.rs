//! Guild entity

use super::{Channel, Member};
use crate::value_objects::Snowflake;
use serde::{Deserialize, Serialize};

/// A guild (server) the current user belongs to
///
/// The initial ready payload lists guilds as unavailable stubs; the full
/// object arrives in a subsequent guild-create dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Snowflake>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,

    #[serde(default)]
    pub unavailable: bool,

    /// Populated in guild-create dispatches, not in REST responses
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<Channel>,

    /// Populated in guild-create dispatches, not in REST responses
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
}

impl Guild {
    /// Whether the guild is large enough that members arrive via chunks
    /// rather than inline in guild-create
    pub fn is_chunked(&self) -> bool {
        self.member_count
            .is_some_and(|count| count as usize > self.members.len())
    }
}

/// Guild stub listed in the ready payload before the full object arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableGuild {
    pub id: Snowflake,

    #[serde(default)]
    pub unavailable: bool,
}
