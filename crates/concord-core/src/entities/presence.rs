//! Presence entity

use crate::value_objects::Snowflake;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Online status values carried by presence updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnlineStatus {
    Online,
    Idle,
    Dnd,
    Offline,
    /// A status string this client version does not know about
    Unknown,
}

impl OnlineStatus {
    /// String form used on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
            Self::Offline => "offline",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a wire status string, tolerating unknown values
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "online" => Self::Online,
            "idle" => Self::Idle,
            "dnd" => Self::Dnd,
            "offline" => Self::Offline,
            _ => Self::Unknown,
        }
    }
}

impl Serialize for OnlineStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OnlineStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_str_lossy(&s))
    }
}

/// Reference to a user inside a presence payload (only the ID is guaranteed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUser {
    pub id: Snowflake,
}

/// A user's presence in a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub user: PresenceUser,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,

    pub status: OnlineStatus,
}
