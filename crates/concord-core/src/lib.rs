//! # concord-core
//!
//! Domain layer containing identifiers, intents, wire entities, and the typed
//! gateway event model. This crate has zero dependencies on infrastructure
//! (HTTP client, WebSocket, async runtime, etc.).

pub mod entities;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Attachment, Channel, ChannelType, Guild, Member, Message, OnlineStatus, Presence,
    UnavailableGuild, User,
};
pub use events::{
    Event, EventDecodeError, EventType, GuildDeleteEvent, GuildMembersChunkEvent, MemberAddEvent,
    MemberRemoveEvent, MemberUpdateEvent, MessageDeleteEvent, MessageUpdateEvent, ReactionEvent,
    ReadyEvent, TypingStartEvent,
};
pub use value_objects::{Intents, Snowflake, SnowflakeParseError};
