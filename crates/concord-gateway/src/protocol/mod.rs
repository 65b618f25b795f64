//! Gateway wire protocol
//!
//! Frame format, operation codes, close codes, and payload definitions.

mod close_codes;
mod frame;
mod opcodes;
mod payloads;

pub use close_codes::{reconnect_required, CloseCode};
pub use frame::GatewayFrame;
pub use opcodes::OpCode;
pub use payloads::{
    HelloPayload, IdentifyPayload, IdentifyProperties, RequestGuildMembersPayload, ResumePayload,
    UpdatePresencePayload,
};
