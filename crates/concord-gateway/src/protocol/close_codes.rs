//! WebSocket close codes
//!
//! Gateway-specific close codes and their reconnect classification. Fatal
//! codes terminate the supervisor; everything else - including codes this
//! client version does not know - triggers a reconnect attempt.

use serde::{Deserialize, Serialize};

/// Gateway WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Unknown error occurred
    UnknownError = 4000,
    /// Invalid opcode sent
    UnknownOpcode = 4001,
    /// Invalid payload encoding (JSON decode error)
    DecodeError = 4002,
    /// Sent payload before Identify
    NotAuthenticated = 4003,
    /// Invalid token provided
    AuthenticationFailed = 4004,
    /// Sent Identify twice
    AlreadyAuthenticated = 4005,
    /// Invalid sequence number for Resume
    InvalidSequence = 4007,
    /// Too many requests (rate limited)
    RateLimited = 4008,
    /// Session has timed out
    SessionTimeout = 4009,
    /// Invalid shard configuration
    InvalidShard = 4010,
    /// Sharding is required
    ShardingRequired = 4011,
    /// Invalid/outdated API version
    InvalidApiVersion = 4012,
    /// Invalid intent bits
    InvalidIntents = 4013,
    /// Intents the account is not approved for
    DisallowedIntents = 4014,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4000 => Some(Self::UnknownError),
            4001 => Some(Self::UnknownOpcode),
            4002 => Some(Self::DecodeError),
            4003 => Some(Self::NotAuthenticated),
            4004 => Some(Self::AuthenticationFailed),
            4005 => Some(Self::AlreadyAuthenticated),
            4007 => Some(Self::InvalidSequence),
            4008 => Some(Self::RateLimited),
            4009 => Some(Self::SessionTimeout),
            4010 => Some(Self::InvalidShard),
            4011 => Some(Self::ShardingRequired),
            4012 => Some(Self::InvalidApiVersion),
            4013 => Some(Self::InvalidIntents),
            4014 => Some(Self::DisallowedIntents),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if the client should attempt to reconnect after this close code
    ///
    /// The complement set is fatal: bad auth, bad shard configuration, bad or
    /// disallowed intents, and a stale API version cannot be fixed by
    /// reconnecting.
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        !matches!(
            self,
            Self::AuthenticationFailed
                | Self::InvalidShard
                | Self::ShardingRequired
                | Self::InvalidApiVersion
                | Self::InvalidIntents
                | Self::DisallowedIntents
        )
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error occurred",
            Self::UnknownOpcode => "Invalid opcode sent",
            Self::DecodeError => "Invalid payload encoding",
            Self::NotAuthenticated => "Not authenticated",
            Self::AuthenticationFailed => "Authentication failed",
            Self::AlreadyAuthenticated => "Already authenticated",
            Self::InvalidSequence => "Invalid sequence number",
            Self::RateLimited => "Rate limited",
            Self::SessionTimeout => "Session timeout",
            Self::InvalidShard => "Invalid shard configuration",
            Self::ShardingRequired => "Sharding required",
            Self::InvalidApiVersion => "Invalid API version",
            Self::InvalidIntents => "Invalid intents",
            Self::DisallowedIntents => "Disallowed intents",
        }
    }

    /// Get the name of this close code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UnknownError => "UnknownError",
            Self::UnknownOpcode => "UnknownOpcode",
            Self::DecodeError => "DecodeError",
            Self::NotAuthenticated => "NotAuthenticated",
            Self::AuthenticationFailed => "AuthenticationFailed",
            Self::AlreadyAuthenticated => "AlreadyAuthenticated",
            Self::InvalidSequence => "InvalidSequence",
            Self::RateLimited => "RateLimited",
            Self::SessionTimeout => "SessionTimeout",
            Self::InvalidShard => "InvalidShard",
            Self::ShardingRequired => "ShardingRequired",
            Self::InvalidApiVersion => "InvalidApiVersion",
            Self::InvalidIntents => "InvalidIntents",
            Self::DisallowedIntents => "DisallowedIntents",
        }
    }
}

/// Classify an observed close code (or its absence)
///
/// Codes outside the table default to reconnect-required, as does a close
/// without any code at all.
#[must_use]
pub fn reconnect_required(code: Option<u16>) -> bool {
    match code.and_then(CloseCode::from_u16) {
        Some(known) => known.should_reconnect(),
        None => true,
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_code_from_u16() {
        assert_eq!(CloseCode::from_u16(4000), Some(CloseCode::UnknownError));
        assert_eq!(CloseCode::from_u16(4004), Some(CloseCode::AuthenticationFailed));
        assert_eq!(CloseCode::from_u16(4014), Some(CloseCode::DisallowedIntents));
        assert_eq!(CloseCode::from_u16(1000), None);
        assert_eq!(CloseCode::from_u16(4006), None); // 4006 is not defined
    }

    #[test]
    fn test_should_reconnect() {
        // Should reconnect
        assert!(CloseCode::UnknownError.should_reconnect());
        assert!(CloseCode::UnknownOpcode.should_reconnect());
        assert!(CloseCode::DecodeError.should_reconnect());
        assert!(CloseCode::NotAuthenticated.should_reconnect());
        assert!(CloseCode::AlreadyAuthenticated.should_reconnect());
        assert!(CloseCode::InvalidSequence.should_reconnect());
        assert!(CloseCode::RateLimited.should_reconnect());
        assert!(CloseCode::SessionTimeout.should_reconnect());

        // Fatal
        assert!(!CloseCode::AuthenticationFailed.should_reconnect());
        assert!(!CloseCode::InvalidShard.should_reconnect());
        assert!(!CloseCode::ShardingRequired.should_reconnect());
        assert!(!CloseCode::InvalidApiVersion.should_reconnect());
        assert!(!CloseCode::InvalidIntents.should_reconnect());
        assert!(!CloseCode::DisallowedIntents.should_reconnect());
    }

    #[test]
    fn test_unlisted_codes_default_to_reconnect() {
        assert!(reconnect_required(Some(4006)));
        assert!(reconnect_required(Some(1006)));
        assert!(reconnect_required(None));
        assert!(reconnect_required(Some(4000)));
        assert!(!reconnect_required(Some(4004)));
    }

    #[test]
    fn test_close_code_display() {
        let code = CloseCode::AuthenticationFailed;
        let display = format!("{}", code);
        assert!(display.contains("4004"));
        assert!(display.contains("Authentication"));
    }
}
