//! Typed events and the per-event decode contract

use super::payloads::{
    GuildDeleteEvent, GuildMembersChunkEvent, MemberAddEvent, MemberRemoveEvent, MemberUpdateEvent,
    MessageDeleteEvent, MessageUpdateEvent, ReactionEvent, ReadyEvent, TypingStartEvent,
};
use super::EventType;
use crate::entities::{Channel, Guild, Message, Presence, User};
use serde_json::Value;

/// A decoded gateway event
///
/// Large payloads are boxed so the enum stays cheap to clone for fan-out.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Ready(Box<ReadyEvent>),
    Resumed,
    GuildCreate(Box<Guild>),
    GuildUpdate(Box<Guild>),
    GuildDelete(GuildDeleteEvent),
    ChannelCreate(Channel),
    ChannelUpdate(Channel),
    ChannelDelete(Channel),
    MessageCreate(Box<Message>),
    MessageUpdate(MessageUpdateEvent),
    MessageDelete(MessageDeleteEvent),
    ReactionAdd(ReactionEvent),
    ReactionRemove(ReactionEvent),
    MemberAdd(Box<MemberAddEvent>),
    MemberUpdate(MemberUpdateEvent),
    MemberRemove(MemberRemoveEvent),
    MemberChunk(GuildMembersChunkEvent),
    PresenceUpdate(Presence),
    TypingStart(TypingStartEvent),
    UserUpdate(User),
}

/// Error decoding a dispatch payload into its typed event
#[derive(Debug, thiserror::Error)]
#[error("failed to decode {event} payload: {source}")]
pub struct EventDecodeError {
    /// Wire name of the event that failed to decode
    pub event: &'static str,
    #[source]
    pub source: serde_json::Error,
}

impl Event {
    /// Decode a dispatch payload by event kind
    ///
    /// This is the single factory keyed by event kind: each arm is the decode
    /// contract for that event's payload.
    pub fn decode(kind: EventType, data: Value) -> Result<Self, EventDecodeError> {
        fn parse<T: serde::de::DeserializeOwned>(
            kind: EventType,
            data: Value,
        ) -> Result<T, EventDecodeError> {
            serde_json::from_value(data).map_err(|source| EventDecodeError {
                event: kind.as_str(),
                source,
            })
        }

        Ok(match kind {
            EventType::Ready => Self::Ready(Box::new(parse(kind, data)?)),
            EventType::Resumed => Self::Resumed,
            EventType::GuildCreate => Self::GuildCreate(Box::new(parse(kind, data)?)),
            EventType::GuildUpdate => Self::GuildUpdate(Box::new(parse(kind, data)?)),
            EventType::GuildDelete => Self::GuildDelete(parse(kind, data)?),
            EventType::ChannelCreate => Self::ChannelCreate(parse(kind, data)?),
            EventType::ChannelUpdate => Self::ChannelUpdate(parse(kind, data)?),
            EventType::ChannelDelete => Self::ChannelDelete(parse(kind, data)?),
            EventType::MessageCreate => Self::MessageCreate(Box::new(parse(kind, data)?)),
            EventType::MessageUpdate => Self::MessageUpdate(parse(kind, data)?),
            EventType::MessageDelete => Self::MessageDelete(parse(kind, data)?),
            EventType::MessageReactionAdd => Self::ReactionAdd(parse(kind, data)?),
            EventType::MessageReactionRemove => Self::ReactionRemove(parse(kind, data)?),
            EventType::GuildMemberAdd => Self::MemberAdd(Box::new(parse(kind, data)?)),
            EventType::GuildMemberUpdate => Self::MemberUpdate(parse(kind, data)?),
            EventType::GuildMemberRemove => Self::MemberRemove(parse(kind, data)?),
            EventType::GuildMembersChunk => Self::MemberChunk(parse(kind, data)?),
            EventType::PresenceUpdate => Self::PresenceUpdate(parse(kind, data)?),
            EventType::TypingStart => Self::TypingStart(parse(kind, data)?),
            EventType::UserUpdate => Self::UserUpdate(parse(kind, data)?),
        })
    }

    /// The kind of this event
    #[must_use]
    pub const fn kind(&self) -> EventType {
        match self {
            Self::Ready(_) => EventType::Ready,
            Self::Resumed => EventType::Resumed,
            Self::GuildCreate(_) => EventType::GuildCreate,
            Self::GuildUpdate(_) => EventType::GuildUpdate,
            Self::GuildDelete(_) => EventType::GuildDelete,
            Self::ChannelCreate(_) => EventType::ChannelCreate,
            Self::ChannelUpdate(_) => EventType::ChannelUpdate,
            Self::ChannelDelete(_) => EventType::ChannelDelete,
            Self::MessageCreate(_) => EventType::MessageCreate,
            Self::MessageUpdate(_) => EventType::MessageUpdate,
            Self::MessageDelete(_) => EventType::MessageDelete,
            Self::ReactionAdd(_) => EventType::MessageReactionAdd,
            Self::ReactionRemove(_) => EventType::MessageReactionRemove,
            Self::MemberAdd(_) => EventType::GuildMemberAdd,
            Self::MemberUpdate(_) => EventType::GuildMemberUpdate,
            Self::MemberRemove(_) => EventType::GuildMemberRemove,
            Self::MemberChunk(_) => EventType::GuildMembersChunk,
            Self::PresenceUpdate(_) => EventType::PresenceUpdate,
            Self::TypingStart(_) => EventType::TypingStart,
            Self::UserUpdate(_) => EventType::UserUpdate,
        }
    }
}
