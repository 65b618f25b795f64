//! Event dispatcher
//!
//! Decodes dispatch frames in arrival order, applies each event's cache
//! mutation before anything else sees it, then fans the event out to
//! listeners as concurrent fire-and-forget tasks. The ready barrier gates
//! the one-shot ready signal behind initial-synchronization convergence.

mod listener;
mod ready_barrier;

pub use listener::{EventListener, RawDispatch};
pub use ready_barrier::ReadyBarrier;

use crate::protocol::{GatewayFrame, RequestGuildMembersPayload};
use crate::session::Session;
use concord_cache::CacheState;
use concord_core::{Event, EventType, Intents};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Decodes inbound dispatches, keeps the cache current, and fans events out
pub struct EventDispatcher {
    cache: Arc<CacheState>,
    intents: Intents,
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
    barrier: Mutex<Option<ReadyBarrier>>,
    ready_tx: watch::Sender<bool>,
    /// Outbound sender of the current connection, for member chunk requests
    outbound: Mutex<Option<mpsc::Sender<GatewayFrame>>>,
}

impl EventDispatcher {
    /// Create a dispatcher over the given cache
    #[must_use]
    pub fn new(cache: Arc<CacheState>, intents: Intents) -> Self {
        let (ready_tx, _ready_rx) = watch::channel(false);
        Self {
            cache,
            intents,
            listeners: RwLock::new(Vec::new()),
            barrier: Mutex::new(None),
            ready_tx,
            outbound: Mutex::new(None),
        }
    }

    /// Register a listener
    pub fn add_listener(&self, listener: Arc<dyn EventListener>) {
        self.listeners.write().push(listener);
    }

    /// Watch the one-shot ready signal for the current identify cycle
    #[must_use]
    pub fn subscribe_ready(&self) -> watch::Receiver<bool> {
        self.ready_tx.subscribe()
    }

    /// Whether ready has fired this identify cycle
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.ready_tx.borrow()
    }

    /// Point chunk requests at the current connection
    pub fn bind(&self, outbound: mpsc::Sender<GatewayFrame>) {
        *self.outbound.lock() = Some(outbound);
    }

    /// Drop the connection binding during teardown
    pub fn unbind(&self) {
        *self.outbound.lock() = None;
    }

    /// Reset the barrier and ready flag ahead of a fresh identify
    ///
    /// Not called on resume: a resumed session keeps its fired flag, so
    /// ready stays exactly-once per identify cycle.
    pub fn reset_ready(&self) {
        *self.barrier.lock() = None;
        self.ready_tx.send_replace(false);
    }

    /// Process one dispatch frame in arrival order
    ///
    /// Returns captured session data when the frame was the ready payload.
    /// Cache mutation happens synchronously here - before fan-out, and
    /// before the caller reads the next frame.
    pub async fn dispatch(&self, raw: RawDispatch) -> Option<Session> {
        let Some(kind) = EventType::from_name(&raw.event) else {
            tracing::debug!(event = %raw.event, "Unknown dispatch event");
            self.fan_out_raw(&raw);
            return None;
        };

        let event = match Event::decode(kind, raw.data.clone()) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to decode dispatch payload");
                self.fan_out_raw(&raw);
                return None;
            }
        };

        let session = self.apply(&event);

        // The typed ready event is withheld until the barrier converges;
        // everything else fans out as-is. Raw always fires.
        if !matches!(event, Event::Ready(_)) {
            self.fan_out_typed(event);
        }
        self.fan_out_raw(&raw);

        session
    }

    /// Apply an event's cache-mutation rule and barrier bookkeeping
    fn apply(&self, event: &Event) -> Option<Session> {
        match event {
            Event::Ready(ready) => {
                self.cache.set_current_user(ready.user.clone());
                let session = Session {
                    id: ready.session_id.clone(),
                    resume_url: ready.resume_gateway_url.clone(),
                };

                *self.barrier.lock() = Some(ReadyBarrier::new(ready.clone()));
                if self.intents.has(Intents::GUILDS) {
                    // Zero listed guilds converges at once
                    self.maybe_fire_ready();
                } else {
                    // Guild events will never arrive: no further convergence
                    self.fire_ready();
                }
                return Some(session);
            }
            Event::Resumed => {
                tracing::debug!("Session resumed");
            }
            Event::GuildCreate(guild) => {
                let guild_id = guild.id;
                self.cache.upsert_guild(guild.as_ref().clone());

                let mut barrier = self.barrier.lock();
                if let Some(barrier) = barrier.as_mut() {
                    barrier.note_guild_created();
                    if self.intents.has(Intents::GUILD_PRESENCES) {
                        barrier.note_chunks_requested(guild_id);
                        self.request_member_chunks(guild_id);
                    }
                }
                drop(barrier);
                self.maybe_fire_ready();
            }
            Event::GuildUpdate(guild) => {
                self.cache.upsert_guild(guild.as_ref().clone());
            }
            Event::GuildDelete(ev) => {
                self.cache.remove_guild(ev.id);
            }
            Event::ChannelCreate(channel) | Event::ChannelUpdate(channel) => {
                self.cache.upsert_channel(channel.clone());
            }
            Event::ChannelDelete(channel) => {
                self.cache.remove_channel(channel.id);
            }
            Event::MessageCreate(message) => {
                self.cache.insert_message(message.as_ref().clone());
            }
            Event::MessageUpdate(ev) => {
                let (content, edited) = (ev.content.clone(), ev.edited_timestamp);
                self.cache.update_message(ev.id, |message| {
                    if let Some(content) = content {
                        message.content = content;
                    }
                    message.edited_timestamp = edited;
                });
            }
            Event::MessageDelete(ev) => {
                self.cache.remove_message(ev.id);
            }
            Event::ReactionAdd(_) | Event::ReactionRemove(_) | Event::TypingStart(_) => {}
            Event::MemberAdd(ev) => {
                if let Some(user) = &ev.member.user {
                    self.cache.upsert_user(user.clone());
                }
                self.cache.adjust_member_count(ev.guild_id, 1);
            }
            Event::MemberUpdate(ev) => {
                self.cache.upsert_user(ev.user.clone());
            }
            Event::MemberRemove(ev) => {
                self.cache.adjust_member_count(ev.guild_id, -1);
            }
            Event::MemberChunk(chunk) => {
                for member in &chunk.members {
                    if let Some(user) = &member.user {
                        self.cache.upsert_user(user.clone());
                    }
                }

                let mut barrier = self.barrier.lock();
                if let Some(barrier) = barrier.as_mut() {
                    barrier.note_chunk_received(chunk.guild_id, chunk.chunk_count);
                }
                drop(barrier);
                self.maybe_fire_ready();
            }
            Event::PresenceUpdate(presence) => {
                self.cache.set_presence(presence.user.id, presence.status);
            }
            Event::UserUpdate(user) => {
                self.cache.upsert_user(user.clone());
                self.cache.set_current_user(user.clone());
            }
        }
        None
    }

    /// Fire ready if the barrier has converged
    fn maybe_fire_ready(&self) {
        let complete = self
            .barrier
            .lock()
            .as_ref()
            .is_some_and(ReadyBarrier::is_complete);
        if complete {
            self.fire_ready();
        }
    }

    /// Fire ready exactly once, discarding the barrier and its chunk state
    fn fire_ready(&self) {
        let Some(barrier) = self.barrier.lock().take() else {
            return;
        };
        let already_fired = self.ready_tx.send_replace(true);
        if already_fired {
            return;
        }

        tracing::info!("Initial synchronization complete, firing ready");
        self.fan_out_typed(Event::Ready(barrier.into_ready()));
    }

    /// Ask the server for a guild's member chunks
    fn request_member_chunks(&self, guild_id: concord_core::Snowflake) {
        let payload = RequestGuildMembersPayload::all_members(guild_id, true);
        let frame = GatewayFrame::request_guild_members(&payload);
        let sent = self
            .outbound
            .lock()
            .as_ref()
            .is_some_and(|outbound| outbound.try_send(frame).is_ok());
        if !sent {
            tracing::warn!(guild_id = %guild_id, "Failed to request member chunks");
        }
    }

    /// Spawn one task per listener for a typed event
    fn fan_out_typed(&self, event: Event) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            let event = event.clone();
            tokio::spawn(async move {
                listener.on_event(event).await;
            });
        }
    }

    /// Spawn one task per listener for the raw payload
    fn fan_out_raw(&self, raw: &RawDispatch) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            let raw = raw.clone();
            tokio::spawn(async move {
                listener.on_raw(raw).await;
            });
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("intents", &self.intents)
            .field("listeners", &self.listeners.read().len())
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingListener {
        ready: AtomicUsize,
        typed: AtomicUsize,
        raw: AtomicUsize,
    }

    impl CountingListener {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                ready: AtomicUsize::new(0),
                typed: AtomicUsize::new(0),
                raw: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl EventListener for CountingListener {
        async fn on_event(&self, event: Event) {
            self.typed.fetch_add(1, Ordering::SeqCst);
            if matches!(event, Event::Ready(_)) {
                self.ready.fetch_add(1, Ordering::SeqCst);
            }
        }

        async fn on_raw(&self, _raw: RawDispatch) {
            self.raw.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn dispatcher(intents: Intents) -> (Arc<EventDispatcher>, Arc<CountingListener>) {
        let cache = Arc::new(CacheState::new(100, Duration::from_secs(60)));
        let dispatcher = Arc::new(EventDispatcher::new(cache, intents));
        let listener = CountingListener::new();
        dispatcher.add_listener(listener.clone());
        (dispatcher, listener)
    }

    fn raw(event: &str, data: serde_json::Value) -> RawDispatch {
        RawDispatch {
            event: event.to_string(),
            sequence: Some(1),
            data,
        }
    }

    fn ready_payload(guilds: u64) -> serde_json::Value {
        let stubs: Vec<serde_json::Value> = (1..=guilds)
            .map(|i| json!({"id": i.to_string(), "unavailable": true}))
            .collect();
        json!({
            "user": {"id": "1", "username": "echo"},
            "session_id": "abc",
            "resume_gateway_url": "ws://resume.local",
            "guilds": stubs,
        })
    }

    fn guild_payload(id: u64) -> serde_json::Value {
        json!({"id": id.to_string(), "name": format!("g{id}")})
    }

    /// Let spawned listener tasks run
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_ready_fires_after_last_guild_create() {
        let (dispatcher, listener) = dispatcher(Intents::GUILDS);
        let mut ready_rx = dispatcher.subscribe_ready();

        let session = dispatcher.dispatch(raw("READY", ready_payload(3))).await;
        assert_eq!(session.unwrap().id, "abc");
        assert!(!*ready_rx.borrow_and_update());

        dispatcher.dispatch(raw("GUILD_CREATE", guild_payload(1))).await;
        dispatcher.dispatch(raw("GUILD_CREATE", guild_payload(2))).await;
        // Two of three guilds: not ready yet
        assert!(!*ready_rx.borrow_and_update());

        dispatcher.dispatch(raw("GUILD_CREATE", guild_payload(3))).await;
        assert!(*ready_rx.borrow_and_update());

        settle().await;
        assert_eq!(listener.ready.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ready_fires_exactly_once() {
        let (dispatcher, listener) = dispatcher(Intents::GUILDS);

        dispatcher.dispatch(raw("READY", ready_payload(1))).await;
        dispatcher.dispatch(raw("GUILD_CREATE", guild_payload(1))).await;
        // A guild joined after convergence must not re-fire ready
        dispatcher.dispatch(raw("GUILD_CREATE", guild_payload(9))).await;

        settle().await;
        assert_eq!(listener.ready.load(Ordering::SeqCst), 1);
        assert!(dispatcher.is_ready());
    }

    #[tokio::test]
    async fn test_ready_immediate_without_guild_intent() {
        let (dispatcher, listener) = dispatcher(Intents::GUILD_MESSAGES);

        dispatcher.dispatch(raw("READY", ready_payload(3))).await;
        assert!(dispatcher.is_ready());

        settle().await;
        assert_eq!(listener.ready.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_presence_intent_gates_ready_on_chunks() {
        let (dispatcher, listener) = dispatcher(Intents::GUILDS | Intents::GUILD_PRESENCES);
        let (outbound_tx, mut outbound_rx) = mpsc::channel(16);
        dispatcher.bind(outbound_tx);

        dispatcher.dispatch(raw("READY", ready_payload(1))).await;
        dispatcher.dispatch(raw("GUILD_CREATE", guild_payload(1))).await;

        // A chunk request went out for the created guild
        let frame = outbound_rx.try_recv().unwrap();
        assert_eq!(frame.op, crate::protocol::OpCode::RequestGuildMembers);

        // All guilds created, chunks outstanding: still not ready
        assert!(!dispatcher.is_ready());

        let chunk = |index: u32| {
            raw(
                "GUILD_MEMBERS_CHUNK",
                json!({
                    "guild_id": "1",
                    "members": [{"user": {"id": "7", "username": "m"}}],
                    "chunk_index": index,
                    "chunk_count": 2,
                }),
            )
        };
        dispatcher.dispatch(chunk(0)).await;
        assert!(!dispatcher.is_ready());

        dispatcher.dispatch(chunk(1)).await;
        assert!(dispatcher.is_ready());

        settle().await;
        assert_eq!(listener.ready.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_ready_allows_next_identify_cycle() {
        let (dispatcher, listener) = dispatcher(Intents::GUILDS);

        dispatcher.dispatch(raw("READY", ready_payload(0))).await;
        assert!(dispatcher.is_ready());

        dispatcher.reset_ready();
        assert!(!dispatcher.is_ready());

        dispatcher.dispatch(raw("READY", ready_payload(0))).await;
        assert!(dispatcher.is_ready());

        settle().await;
        assert_eq!(listener.ready.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_mutation_precedes_fanout() {
        let (dispatcher, _listener) = dispatcher(Intents::GUILD_MESSAGES);

        dispatcher
            .dispatch(raw(
                "MESSAGE_CREATE",
                json!({"id": "9", "channel_id": "7", "author": {"id": "1", "username": "echo"}, "content": "hi"}),
            ))
            .await;

        // dispatch() returned, so the mutation is already visible
        let message = dispatcher.cache.message(concord_core::Snowflake::new(9)).unwrap();
        assert_eq!(message.content, "hi");

        dispatcher
            .dispatch(raw("MESSAGE_DELETE", json!({"id": "9", "channel_id": "7"})))
            .await;
        assert!(dispatcher.cache.message(concord_core::Snowflake::new(9)).is_none());
    }

    #[tokio::test]
    async fn test_unknown_event_fires_raw_only() {
        let (dispatcher, listener) = dispatcher(Intents::GUILDS);

        dispatcher.dispatch(raw("VOICE_SERVER_UPDATE", json!({}))).await;
        settle().await;

        assert_eq!(listener.raw.load(Ordering::SeqCst), 1);
        assert_eq!(listener.typed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_decode_failure_still_fires_raw() {
        let (dispatcher, listener) = dispatcher(Intents::GUILDS);

        // content must be a string; decode fails but raw is not lost
        dispatcher
            .dispatch(raw("MESSAGE_CREATE", json!({"content": 5})))
            .await;
        settle().await;

        assert_eq!(listener.raw.load(Ordering::SeqCst), 1);
        assert_eq!(listener.typed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resumed_does_not_refire_ready() {
        let (dispatcher, listener) = dispatcher(Intents::GUILDS);

        dispatcher.dispatch(raw("READY", ready_payload(0))).await;
        dispatcher.dispatch(raw("RESUMED", json!(null))).await;

        settle().await;
        assert_eq!(listener.ready.load(Ordering::SeqCst), 1);
    }
}
