//! Client-side state arena
//!
//! ID-keyed maps for guilds, users, channels, and presences, plus the bounded
//! message cache. The arena is owned by the client object; only the event
//! dispatcher mutates it. Readers get cloned snapshots — a snapshot taken by
//! a listener task may be superseded by a later dispatch at any time.

use crate::bounded::BoundedCache;
use concord_core::{Channel, Guild, Message, OnlineStatus, Snowflake, User};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::time::Duration;

/// All cached domain state for one client session
pub struct CacheState {
    guilds: DashMap<Snowflake, Guild>,
    users: DashMap<Snowflake, User>,
    channels: DashMap<Snowflake, Channel>,
    presences: DashMap<Snowflake, OnlineStatus>,
    messages: BoundedCache<Message>,
    current_user: RwLock<Option<User>>,
}

impl CacheState {
    /// Create an empty arena with the given message cache bounds
    #[must_use]
    pub fn new(message_capacity: usize, message_ttl: Duration) -> Self {
        Self {
            guilds: DashMap::new(),
            users: DashMap::new(),
            channels: DashMap::new(),
            presences: DashMap::new(),
            messages: BoundedCache::new(message_capacity, message_ttl),
            current_user: RwLock::new(None),
        }
    }

    // === Writers (dispatcher only) ===

    /// Insert or replace a guild, indexing its channels and member users
    pub fn upsert_guild(&self, guild: Guild) {
        for channel in &guild.channels {
            self.channels.insert(channel.id, channel.clone());
        }
        for member in &guild.members {
            if let Some(user) = &member.user {
                self.users.insert(user.id, user.clone());
            }
        }
        self.guilds.insert(guild.id, guild);
    }

    /// Remove a guild and its channels
    pub fn remove_guild(&self, guild_id: Snowflake) -> Option<Guild> {
        let (_, guild) = self.guilds.remove(&guild_id)?;
        self.channels.retain(|_, channel| channel.guild_id != Some(guild_id));
        Some(guild)
    }

    /// Insert or replace a channel
    pub fn upsert_channel(&self, channel: Channel) {
        self.channels.insert(channel.id, channel);
    }

    /// Remove a channel
    pub fn remove_channel(&self, channel_id: Snowflake) -> Option<Channel> {
        self.channels.remove(&channel_id).map(|(_, channel)| channel)
    }

    /// Insert or replace a user
    pub fn upsert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Record a message, caching its author as a user
    pub fn insert_message(&self, message: Message) {
        if let Some(author) = &message.author {
            self.users.insert(author.id, author.clone());
        }
        self.messages.insert(message.id, message);
    }

    /// Apply a partial edit to a cached message, if present
    pub fn update_message(&self, message_id: Snowflake, f: impl FnOnce(&mut Message)) {
        if let Some(mut message) = self.messages.get(message_id) {
            f(&mut message);
            self.messages.insert(message_id, message);
        }
    }

    /// Drop a message from the bounded cache
    pub fn remove_message(&self, message_id: Snowflake) -> Option<Message> {
        self.messages.remove(message_id)
    }

    /// Record a user's presence
    pub fn set_presence(&self, user_id: Snowflake, status: OnlineStatus) {
        self.presences.insert(user_id, status);
    }

    /// Adjust a guild's member count by `delta`
    pub fn adjust_member_count(&self, guild_id: Snowflake, delta: i64) {
        if let Some(mut guild) = self.guilds.get_mut(&guild_id) {
            if let Some(count) = guild.member_count {
                guild.member_count = Some(count.saturating_add_signed(delta));
            }
        }
    }

    /// Replace the current user
    pub fn set_current_user(&self, user: User) {
        *self.current_user.write() = Some(user);
    }

    // === Readers (snapshots) ===

    /// Get a guild snapshot
    pub fn guild(&self, guild_id: Snowflake) -> Option<Guild> {
        self.guilds.get(&guild_id).map(|g| g.clone())
    }

    /// Get a user snapshot
    pub fn user(&self, user_id: Snowflake) -> Option<User> {
        self.users.get(&user_id).map(|u| u.clone())
    }

    /// Get a channel snapshot
    pub fn channel(&self, channel_id: Snowflake) -> Option<Channel> {
        self.channels.get(&channel_id).map(|c| c.clone())
    }

    /// Get a cached message, refreshing its cache expiry
    pub fn message(&self, message_id: Snowflake) -> Option<Message> {
        self.messages.get(message_id)
    }

    /// Get a user's last known presence
    pub fn presence(&self, user_id: Snowflake) -> Option<OnlineStatus> {
        self.presences.get(&user_id).map(|p| *p)
    }

    /// The authenticated user, once READY has been processed
    pub fn current_user(&self) -> Option<User> {
        self.current_user.read().clone()
    }

    /// Number of cached guilds
    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    /// Number of cached messages
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// IDs of all cached guilds
    pub fn guild_ids(&self) -> Vec<Snowflake> {
        self.guilds.iter().map(|g| *g.key()).collect()
    }
}

impl std::fmt::Debug for CacheState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheState")
            .field("guilds", &self.guilds.len())
            .field("users", &self.users.len())
            .field("channels", &self.channels.len())
            .field("messages", &self.messages)
            .finish()
    }
}
