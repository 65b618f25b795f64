//! Guild member entity

use super::User;
use crate::value_objects::Snowflake;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's membership in one guild
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Snowflake>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
}

impl Member {
    /// The member's user ID, when the user object was included
    pub fn user_id(&self) -> Option<Snowflake> {
        self.user.as_ref().map(|u| u.id)
    }

    /// Nickname if set, else the user's display name
    pub fn display_name(&self) -> Option<&str> {
        self.nick
            .as_deref()
            .or_else(|| self.user.as_ref().map(User::display_name))
    }
}
