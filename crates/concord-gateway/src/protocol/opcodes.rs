//! Gateway operation codes
//!
//! Defines all WebSocket gateway op codes per the protocol specification.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Gateway operation codes
///
/// Op codes define the type of message being sent or received over the
/// WebSocket connection, from the client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Server dispatches an event (receive only)
    Dispatch = 0,
    /// Heartbeat - keep connection alive (send; server may request one)
    Heartbeat = 1,
    /// Identify - authenticate a new session (send only)
    Identify = 2,
    /// Presence Update - update online status (send only)
    PresenceUpdate = 3,
    /// Voice State Update - join/leave voice channels (send only)
    VoiceStateUpdate = 4,
    /// Resume - resume a dropped session (send only)
    Resume = 6,
    /// Reconnect - server requests a reconnect (receive only)
    Reconnect = 7,
    /// Request Guild Members - ask for member chunks (send only)
    RequestGuildMembers = 8,
    /// Invalid Session - session was invalidated (receive only)
    InvalidSession = 9,
    /// Hello - sent by the server on connect (receive only)
    Hello = 10,
    /// Heartbeat ACK - heartbeat acknowledged (receive only)
    HeartbeatAck = 11,
}

impl OpCode {
    /// Create an `OpCode` from a raw integer value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Dispatch),
            1 => Some(Self::Heartbeat),
            2 => Some(Self::Identify),
            3 => Some(Self::PresenceUpdate),
            4 => Some(Self::VoiceStateUpdate),
            6 => Some(Self::Resume),
            7 => Some(Self::Reconnect),
            8 => Some(Self::RequestGuildMembers),
            9 => Some(Self::InvalidSession),
            10 => Some(Self::Hello),
            11 => Some(Self::HeartbeatAck),
            _ => None,
        }
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if this op code can be sent by the client
    #[must_use]
    pub const fn is_send(self) -> bool {
        matches!(
            self,
            Self::Heartbeat
                | Self::Identify
                | Self::PresenceUpdate
                | Self::VoiceStateUpdate
                | Self::Resume
                | Self::RequestGuildMembers
        )
    }

    /// Check if this op code can be received from the server
    #[must_use]
    pub const fn is_receive(self) -> bool {
        matches!(
            self,
            Self::Dispatch
                | Self::Heartbeat
                | Self::Reconnect
                | Self::InvalidSession
                | Self::Hello
                | Self::HeartbeatAck
        )
    }

    /// Get the name of this op code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "Dispatch",
            Self::Heartbeat => "Heartbeat",
            Self::Identify => "Identify",
            Self::PresenceUpdate => "PresenceUpdate",
            Self::VoiceStateUpdate => "VoiceStateUpdate",
            Self::Resume => "Resume",
            Self::Reconnect => "Reconnect",
            Self::RequestGuildMembers => "RequestGuildMembers",
            Self::InvalidSession => "InvalidSession",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "HeartbeatAck",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value).ok_or_else(|| serde::de::Error::custom(format!("invalid op code: {value}")))
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_from_u8() {
        assert_eq!(OpCode::from_u8(0), Some(OpCode::Dispatch));
        assert_eq!(OpCode::from_u8(1), Some(OpCode::Heartbeat));
        assert_eq!(OpCode::from_u8(2), Some(OpCode::Identify));
        assert_eq!(OpCode::from_u8(3), Some(OpCode::PresenceUpdate));
        assert_eq!(OpCode::from_u8(4), Some(OpCode::VoiceStateUpdate));
        assert_eq!(OpCode::from_u8(6), Some(OpCode::Resume));
        assert_eq!(OpCode::from_u8(7), Some(OpCode::Reconnect));
        assert_eq!(OpCode::from_u8(8), Some(OpCode::RequestGuildMembers));
        assert_eq!(OpCode::from_u8(9), Some(OpCode::InvalidSession));
        assert_eq!(OpCode::from_u8(10), Some(OpCode::Hello));
        assert_eq!(OpCode::from_u8(11), Some(OpCode::HeartbeatAck));
        assert_eq!(OpCode::from_u8(5), None);
        assert_eq!(OpCode::from_u8(255), None);
    }

    #[test]
    fn test_send_ops() {
        assert!(OpCode::Heartbeat.is_send());
        assert!(OpCode::Identify.is_send());
        assert!(OpCode::Resume.is_send());
        assert!(OpCode::RequestGuildMembers.is_send());
        assert!(!OpCode::Dispatch.is_send());
        assert!(!OpCode::Hello.is_send());
    }

    #[test]
    fn test_receive_ops() {
        assert!(OpCode::Dispatch.is_receive());
        assert!(OpCode::Heartbeat.is_receive());
        assert!(OpCode::Reconnect.is_receive());
        assert!(OpCode::InvalidSession.is_receive());
        assert!(OpCode::Hello.is_receive());
        assert!(OpCode::HeartbeatAck.is_receive());
        assert!(!OpCode::Identify.is_receive());
        assert!(!OpCode::Resume.is_receive());
    }

    #[test]
    fn test_opcode_serialization() {
        let json = serde_json::to_string(&OpCode::Hello).unwrap();
        assert_eq!(json, "10");

        let op: OpCode = serde_json::from_str("2").unwrap();
        assert_eq!(op, OpCode::Identify);

        assert!(serde_json::from_str::<OpCode>("5").is_err());
    }

    #[test]
    fn test_opcode_display() {
        assert_eq!(format!("{}", OpCode::Hello), "Hello (10)");
        assert_eq!(format!("{}", OpCode::Dispatch), "Dispatch (0)");
    }
}
