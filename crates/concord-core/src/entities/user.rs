//! User entity

use crate::value_objects::Snowflake;
use serde::{Deserialize, Serialize};

/// A platform user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,

    /// Display name, when distinct from the username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,

    /// Avatar image hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Whether this account is an automated bot user
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// The name to show in user-facing contexts
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }

    /// Legacy `name#discriminator` tag, or the bare username
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if d != "0" => format!("{}#{d}", self.username),
            _ => self.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(global_name: Option<&str>, discriminator: Option<&str>) -> User {
        User {
            id: Snowflake::new(1),
            username: "echo".to_string(),
            discriminator: discriminator.map(str::to_string),
            global_name: global_name.map(str::to_string),
            avatar: None,
            bot: false,
        }
    }

    #[test]
    fn test_display_name_prefers_global_name() {
        assert_eq!(user(Some("Echo"), None).display_name(), "Echo");
        assert_eq!(user(None, None).display_name(), "echo");
    }

    #[test]
    fn test_tag() {
        assert_eq!(user(None, Some("1234")).tag(), "echo#1234");
        assert_eq!(user(None, Some("0")).tag(), "echo");
        assert_eq!(user(None, None).tag(), "echo");
    }

    #[test]
    fn test_decode_minimal_payload() {
        let json = r#"{"id": "42", "username": "echo"}"#;
        let u: User = serde_json::from_str(json).unwrap();
        assert_eq!(u.id, Snowflake::new(42));
        assert!(!u.bot);
        assert!(u.avatar.is_none());
    }
}
