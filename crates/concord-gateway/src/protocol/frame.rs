//! Gateway frame format
//!
//! All traffic on the WebSocket is a JSON object `{op, d, s, t}`. The
//! sequence (`s`) and event name (`t`) fields only appear on dispatches.

use super::{
    HelloPayload, IdentifyPayload, OpCode, RequestGuildMembersPayload, ResumePayload,
    UpdatePresencePayload,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One gateway frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayFrame {
    /// Operation code
    pub op: OpCode,

    /// Payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,

    /// Sequence number (only on op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event type (only on op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayFrame {
    fn send(op: OpCode, d: Option<Value>) -> Self {
        Self {
            op,
            d,
            s: None,
            t: None,
        }
    }

    // === Frames this client sends ===

    /// Create a Heartbeat frame (op=1) carrying the last known sequence
    ///
    /// `d` is null when no dispatch has been received yet this session.
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        let d = match last_sequence {
            Some(seq) => Value::Number(seq.into()),
            None => Value::Null,
        };
        Self::send(OpCode::Heartbeat, Some(d))
    }

    /// Create an Identify frame (op=2)
    #[must_use]
    pub fn identify(payload: &IdentifyPayload) -> Self {
        Self::send(OpCode::Identify, serde_json::to_value(payload).ok())
    }

    /// Create a Resume frame (op=6)
    #[must_use]
    pub fn resume(payload: &ResumePayload) -> Self {
        Self::send(OpCode::Resume, serde_json::to_value(payload).ok())
    }

    /// Create a Presence Update frame (op=3)
    #[must_use]
    pub fn presence_update(payload: &UpdatePresencePayload) -> Self {
        Self::send(OpCode::PresenceUpdate, serde_json::to_value(payload).ok())
    }

    /// Create a Request Guild Members frame (op=8)
    #[must_use]
    pub fn request_guild_members(payload: &RequestGuildMembersPayload) -> Self {
        Self::send(OpCode::RequestGuildMembers, serde_json::to_value(payload).ok())
    }

    // === Parsing frames the server sends ===

    /// Try to parse as a Hello payload (op=10)
    #[must_use]
    pub fn as_hello(&self) -> Option<HelloPayload> {
        if self.op != OpCode::Hello {
            return None;
        }
        self.d.as_ref().and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Read the resumable flag of an Invalid Session frame (op=9)
    #[must_use]
    pub fn as_invalid_session(&self) -> Option<bool> {
        if self.op != OpCode::InvalidSession {
            return None;
        }
        Some(self.d.as_ref().and_then(Value::as_bool).unwrap_or(false))
    }

    /// Check whether this frame is a dispatch (op=0)
    #[must_use]
    pub fn is_dispatch(&self) -> bool {
        self.op == OpCode::Dispatch
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayFrame(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayFrame(op={})", self.op)
        }
    }
}
