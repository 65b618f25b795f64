//! Channel entity

use crate::value_objects::Snowflake;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Channel kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    /// Guild text channel
    Text,
    /// Direct message between two users
    Dm,
    /// Guild voice channel
    Voice,
    /// Direct message between multiple users
    Group,
    /// Organizational category
    Category,
    /// A kind this client version does not know about
    Unknown(u8),
}

impl ChannelType {
    /// Create a `ChannelType` from a raw integer value
    #[must_use]
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Text,
            1 => Self::Dm,
            2 => Self::Voice,
            3 => Self::Group,
            4 => Self::Category,
            other => Self::Unknown(other),
        }
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Text => 0,
            Self::Dm => 1,
            Self::Voice => 2,
            Self::Group => 3,
            Self::Category => 4,
            Self::Unknown(other) => other,
        }
    }

    /// Whether messages can be sent to this channel kind
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::Text | Self::Dm | Self::Group)
    }
}

impl Serialize for ChannelType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for ChannelType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Ok(Self::from_u8(value))
    }
}

/// A guild channel or direct-message channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Snowflake,

    #[serde(rename = "type")]
    pub kind: ChannelType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,

    /// Present on DM channels only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<super::User>,
}
