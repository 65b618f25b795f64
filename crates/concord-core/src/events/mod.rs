//! Typed gateway event model
//!
//! Dispatch frames carry an event name in `t` and an arbitrary JSON payload
//! in `d`. This module maps known names to typed payloads with explicit
//! per-event decode contracts; decode failures surface as typed errors.

mod event;
mod event_types;
mod payloads;

pub use event::{Event, EventDecodeError};
pub use event_types::EventType;
pub use payloads::{
    GuildDeleteEvent, GuildMembersChunkEvent, MemberAddEvent, MemberRemoveEvent, MemberUpdateEvent,
    MessageDeleteEvent, MessageUpdateEvent, ReactionEmoji, ReactionEvent, ReadyEvent,
    TypingStartEvent,
};
