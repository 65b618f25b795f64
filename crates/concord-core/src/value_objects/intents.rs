//! Gateway intents bitfield
//!
//! Intents are opt-in flags sent with Identify that control which event
//! categories the gateway delivers to this session.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Gateway intent flags
    ///
    /// Serialized as a plain integer bitfield in the Identify payload.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u64 {
        /// Guild create/update/delete and channel/role structure events
        const GUILDS                    = 1 << 0;
        /// Member add/update/remove events (privileged)
        const GUILD_MEMBERS             = 1 << 1;
        /// Bans and moderation events
        const GUILD_MODERATION          = 1 << 2;
        /// Emoji and sticker updates
        const GUILD_EMOJIS              = 1 << 3;
        /// Integration updates
        const GUILD_INTEGRATIONS        = 1 << 4;
        /// Webhook updates
        const GUILD_WEBHOOKS            = 1 << 5;
        /// Invite create/delete
        const GUILD_INVITES             = 1 << 6;
        /// Voice state updates
        const GUILD_VOICE_STATES        = 1 << 7;
        /// Presence updates (privileged)
        const GUILD_PRESENCES           = 1 << 8;
        /// Messages in guild channels
        const GUILD_MESSAGES            = 1 << 9;
        /// Reactions in guild channels
        const GUILD_MESSAGE_REACTIONS   = 1 << 10;
        /// Typing indicators in guild channels
        const GUILD_MESSAGE_TYPING      = 1 << 11;
        /// Messages in direct channels
        const DIRECT_MESSAGES           = 1 << 12;
        /// Reactions in direct channels
        const DIRECT_MESSAGE_REACTIONS  = 1 << 13;
        /// Typing indicators in direct channels
        const DIRECT_MESSAGE_TYPING     = 1 << 14;
        /// Full message content (privileged)
        const MESSAGE_CONTENT           = 1 << 15;

        /// Every non-privileged intent
        const NON_PRIVILEGED = Self::GUILDS.bits()
            | Self::GUILD_MODERATION.bits()
            | Self::GUILD_EMOJIS.bits()
            | Self::GUILD_INTEGRATIONS.bits()
            | Self::GUILD_WEBHOOKS.bits()
            | Self::GUILD_INVITES.bits()
            | Self::GUILD_VOICE_STATES.bits()
            | Self::GUILD_MESSAGES.bits()
            | Self::GUILD_MESSAGE_REACTIONS.bits()
            | Self::GUILD_MESSAGE_TYPING.bits()
            | Self::DIRECT_MESSAGES.bits()
            | Self::DIRECT_MESSAGE_REACTIONS.bits()
            | Self::DIRECT_MESSAGE_TYPING.bits();
    }
}

impl Intents {
    /// Check whether this intent set includes a required intent
    #[inline]
    pub fn has(&self, intent: Intents) -> bool {
        self.contains(intent)
    }

    /// Get the raw bits (for the Identify payload)
    #[inline]
    pub fn to_u64(self) -> u64 {
        self.bits()
    }

    /// Create from raw bits, discarding unknown flags
    #[inline]
    pub fn from_u64(bits: u64) -> Self {
        Intents::from_bits_truncate(bits)
    }
}

impl Default for Intents {
    fn default() -> Self {
        Self::NON_PRIVILEGED
    }
}

impl fmt::Display for Intents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u64::deserialize(deserializer)?;
        Ok(Intents::from_bits_truncate(bits))
    }
}
