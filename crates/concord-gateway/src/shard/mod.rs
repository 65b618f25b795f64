//! Connection supervisor
//!
//! Owns one persistent gateway connection: handshake, heartbeat task,
//! resume/reconnect state machine, close-code classification. `run` blocks
//! until a fatal condition or an explicit disconnect; transient reconnects
//! are invisible to the caller.

mod backoff;
mod heartbeat;

use backoff::ReconnectBackoff;
use heartbeat::Heartbeater;

use crate::dispatch::{EventDispatcher, RawDispatch};
use crate::error::GatewayError;
use crate::protocol::{
    CloseCode, GatewayFrame, HelloPayload, IdentifyPayload, IdentifyProperties, OpCode,
    RequestGuildMembersPayload, ResumePayload, UpdatePresencePayload,
};
use crate::session::{Sequence, Session};
use crate::transport::{GatewayConnection, GatewayTransport, SocketEvent};
use concord_common::{ClientConfig, ShardConfig};
use concord_core::{EventType, OnlineStatus, Snowflake};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Notify};

/// Supervisor lifecycle stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStage {
    /// No connection and none being attempted
    Disconnected,
    /// Opening the socket for a fresh session
    Connecting,
    /// Socket open, waiting for the server hello
    AwaitingHello,
    /// Hello received, identify sent
    Identifying,
    /// Hello received, resume sent
    Resuming,
    /// Session established; dispatches flowing
    Active,
    /// Recoverable failure; waiting to reconnect
    Reconnecting,
    /// Fatal close code observed; no further attempts
    Terminal,
}

impl ConnectionStage {
    /// Get the name of this stage
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::AwaitingHello => "AwaitingHello",
            Self::Identifying => "Identifying",
            Self::Resuming => "Resuming",
            Self::Active => "Active",
            Self::Reconnecting => "Reconnecting",
            Self::Terminal => "Terminal",
        }
    }
}

impl std::fmt::Display for ConnectionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a connection ended, when it ended recoverably
enum ConnectionOutcome {
    /// Explicit disconnect was requested
    Shutdown,
    /// Recoverable failure; resume when `resumable` and session data exists
    Reconnect { resumable: bool },
}

/// What the handshake wait produced
enum HelloOutcome {
    Hello(HelloPayload),
    Closed,
    Shutdown,
}

/// One supervised gateway connection
pub struct Shard {
    config: Arc<ClientConfig>,
    transport: Arc<dyn GatewayTransport>,
    dispatcher: Arc<EventDispatcher>,
    stage: Mutex<ConnectionStage>,
    sequence: Arc<Sequence>,
    session: Mutex<Option<Session>>,
    /// True while the session is active (flipped by disconnect/teardown)
    connected: AtomicBool,
    /// True once any handshake has completed; initial handshake failures
    /// are fatal, later ones are absorbed by the reconnect loop
    ever_active: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    /// Outbound sender of the live connection, for presence updates etc.
    outbound: Mutex<Option<mpsc::Sender<GatewayFrame>>>,
}

impl Shard {
    /// Create a supervisor; nothing connects until [`run`](Self::run)
    #[must_use]
    pub fn new(
        config: Arc<ClientConfig>,
        transport: Arc<dyn GatewayTransport>,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            transport,
            dispatcher,
            stage: Mutex::new(ConnectionStage::Disconnected),
            sequence: Arc::new(Sequence::new()),
            session: Mutex::new(None),
            connected: AtomicBool::new(false),
            ever_active: AtomicBool::new(false),
            shutdown_tx,
            outbound: Mutex::new(None),
        }
    }

    /// Current lifecycle stage
    #[must_use]
    pub fn stage(&self) -> ConnectionStage {
        *self.stage.lock()
    }

    /// Whether the session is currently active
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Resumable session data, when a session is established
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.session.lock().clone()
    }

    /// Request a disconnect; [`run`](Self::run) returns once observed
    pub fn disconnect(&self) {
        tracing::info!("Disconnect requested");
        self.connected.store(false, Ordering::SeqCst);
        self.shutdown_tx.send_replace(true);
    }

    /// Update the client's presence on the active connection
    pub fn update_presence(&self, status: OnlineStatus) -> Result<(), GatewayError> {
        let payload = UpdatePresencePayload {
            status: status.as_str().to_string(),
        };
        self.send(GatewayFrame::presence_update(&payload))
    }

    /// Request member chunks for a guild on the active connection
    pub fn request_guild_members(&self, guild_id: Snowflake) -> Result<(), GatewayError> {
        let payload = RequestGuildMembersPayload::all_members(guild_id, false);
        self.send(GatewayFrame::request_guild_members(&payload))
    }

    fn send(&self, frame: GatewayFrame) -> Result<(), GatewayError> {
        let outbound = self.outbound.lock();
        let sender = outbound.as_ref().ok_or(GatewayError::NotConnected)?;
        sender.try_send(frame).map_err(|_| GatewayError::NotConnected)
    }

    fn set_stage(&self, stage: ConnectionStage) {
        let mut current = self.stage.lock();
        if *current != stage {
            tracing::debug!(from = %current, to = %stage, "Connection stage changed");
            *current = stage;
        }
    }

    /// Connect and supervise until a fatal condition or explicit disconnect
    ///
    /// All reconnects and resumes happen inside this call. It returns `Ok`
    /// only after [`disconnect`](Self::disconnect), and `Err` on a fatal
    /// close code or a failure to establish the initial connection.
    pub async fn run(&self) -> Result<(), GatewayError> {
        self.shutdown_tx.send_replace(false);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut backoff = ReconnectBackoff::new();
        let mut established = false;

        loop {
            if *self.shutdown_tx.borrow() {
                self.set_stage(ConnectionStage::Disconnected);
                return Ok(());
            }

            let resuming = self.session.lock().is_some();
            self.set_stage(if resuming {
                ConnectionStage::Resuming
            } else {
                ConnectionStage::Connecting
            });

            let url = self.connect_url();
            tracing::info!(url = %url, resuming, "Connecting to gateway");

            let attempt = tokio::select! {
                _ = shutdown_rx.wait_for(|stop| *stop) => {
                    self.set_stage(ConnectionStage::Disconnected);
                    return Ok(());
                }
                attempt = self.transport.connect(&url) => attempt,
            };
            let connection = match attempt {
                Ok(connection) => connection,
                Err(err) => {
                    if !established {
                        // A fatal initial failure surfaces to the caller
                        self.set_stage(ConnectionStage::Terminal);
                        return Err(err.into());
                    }
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Reconnect attempt failed, backing off"
                    );
                    self.set_stage(ConnectionStage::Reconnecting);
                    if self.sleep_or_shutdown(&mut shutdown_rx, delay).await {
                        self.set_stage(ConnectionStage::Disconnected);
                        return Ok(());
                    }
                    continue;
                }
            };
            established = true;

            match self.run_connection(connection, &mut shutdown_rx).await {
                Ok(ConnectionOutcome::Shutdown) => {
                    self.set_stage(ConnectionStage::Disconnected);
                    return Ok(());
                }
                Ok(ConnectionOutcome::Reconnect { resumable }) => {
                    if !resumable {
                        tracing::info!("Session not resumable, will re-identify");
                        *self.session.lock() = None;
                        self.sequence.reset();
                    }
                    self.set_stage(ConnectionStage::Reconnecting);
                    let delay = backoff.next_delay();
                    if self.sleep_or_shutdown(&mut shutdown_rx, delay).await {
                        self.set_stage(ConnectionStage::Disconnected);
                        return Ok(());
                    }
                }
                Err(GatewayError::Handshake(reason))
                    if self.ever_active.load(Ordering::SeqCst) =>
                {
                    // Handshake trouble on a reconnect is recoverable
                    tracing::warn!(reason = %reason, "Handshake failed, retrying");
                    self.set_stage(ConnectionStage::Reconnecting);
                    let delay = backoff.next_delay();
                    if self.sleep_or_shutdown(&mut shutdown_rx, delay).await {
                        self.set_stage(ConnectionStage::Disconnected);
                        return Ok(());
                    }
                }
                Err(err) => {
                    self.set_stage(ConnectionStage::Terminal);
                    return Err(err);
                }
            }
        }
    }

    /// Sleep `delay`, returning true if a disconnect arrived first
    async fn sleep_or_shutdown(
        &self,
        shutdown_rx: &mut watch::Receiver<bool>,
        delay: std::time::Duration,
    ) -> bool {
        tokio::select! {
            _ = shutdown_rx.wait_for(|stop| *stop) => true,
            () = tokio::time::sleep(delay) => false,
        }
    }

    /// Drive one connection from handshake to teardown
    async fn run_connection(
        &self,
        mut connection: GatewayConnection,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> Result<ConnectionOutcome, GatewayError> {
        self.set_stage(ConnectionStage::AwaitingHello);
        let hello = match self.await_hello(&mut connection, shutdown_rx).await? {
            HelloOutcome::Hello(hello) => hello,
            HelloOutcome::Closed => return Ok(ConnectionOutcome::Reconnect { resumable: true }),
            HelloOutcome::Shutdown => return Ok(ConnectionOutcome::Shutdown),
        };
        self.ever_active.store(true, Ordering::SeqCst);

        // Resume when session data is available, else identify fresh
        let auth = {
            let session = self.session.lock();
            match session.as_ref() {
                Some(session) => {
                    self.set_stage(ConnectionStage::Resuming);
                    tracing::info!(session_id = %session.id, "Resuming session");
                    self.resume_frame(session)
                }
                None => {
                    self.set_stage(ConnectionStage::Identifying);
                    self.sequence.reset();
                    self.dispatcher.reset_ready();
                    self.identify_frame()
                }
            }
        };
        if connection.outbound.send(auth).await.is_err() {
            return Ok(ConnectionOutcome::Reconnect { resumable: true });
        }

        *self.outbound.lock() = Some(connection.outbound.clone());
        self.dispatcher.bind(connection.outbound.clone());

        let acked = Arc::new(AtomicBool::new(true));
        let zombie = Arc::new(Notify::new());
        let heartbeat = tokio::spawn(
            Heartbeater::new(
                hello.heartbeat_interval,
                connection.outbound.clone(),
                self.sequence.clone(),
                acked.clone(),
                zombie.clone(),
            )
            .run(),
        );

        let result = self.read_loop(&mut connection, &acked, &zombie, shutdown_rx).await;

        // Teardown: stop the heartbeat and drop every outbound handle so
        // the transport's writer closes the socket
        heartbeat.abort();
        self.dispatcher.unbind();
        *self.outbound.lock() = None;
        self.connected.store(false, Ordering::SeqCst);

        result
    }

    /// Wait for the server hello, bounded by the handshake timeout
    async fn await_hello(
        &self,
        connection: &mut GatewayConnection,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> Result<HelloOutcome, GatewayError> {
        let deadline = tokio::time::sleep(self.config.handshake_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = shutdown_rx.wait_for(|stop| *stop) => return Ok(HelloOutcome::Shutdown),
                () = &mut deadline => {
                    return Err(GatewayError::Handshake("timed out waiting for hello".to_string()));
                }
                event = connection.inbound.recv() => match event {
                    None => return Ok(HelloOutcome::Closed),
                    Some(SocketEvent::Closed(code)) => {
                        return match self.classify_close(code) {
                            Ok(_) => Ok(HelloOutcome::Closed),
                            Err(err) => Err(err),
                        };
                    }
                    Some(SocketEvent::Frame(frame)) => {
                        if let Some(hello) = frame.as_hello() {
                            return Ok(HelloOutcome::Hello(hello));
                        }
                        tracing::debug!(op = %frame.op, "Ignoring frame before hello");
                    }
                }
            }
        }
    }

    /// Process inbound events until the connection ends one way or another
    async fn read_loop(
        &self,
        connection: &mut GatewayConnection,
        acked: &Arc<AtomicBool>,
        zombie: &Arc<Notify>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> Result<ConnectionOutcome, GatewayError> {
        // Registered once so a notification cannot slip between iterations
        let zombied = zombie.notified();
        tokio::pin!(zombied);

        loop {
            tokio::select! {
                _ = async { let _ = shutdown_rx.wait_for(|stop| *stop).await; } => {
                    return Ok(ConnectionOutcome::Shutdown);
                }
                () = &mut zombied => {
                    tracing::warn!("Connection zombied, reconnecting");
                    return Ok(ConnectionOutcome::Reconnect { resumable: true });
                }
                event = connection.inbound.recv() => match event {
                    None => return Ok(ConnectionOutcome::Reconnect { resumable: true }),
                    Some(SocketEvent::Closed(code)) => return self.classify_close(code),
                    Some(SocketEvent::Frame(frame)) => {
                        if let Some(outcome) = self.handle_frame(frame, connection, acked).await {
                            return Ok(outcome);
                        }
                    }
                }
            }
        }
    }

    /// Handle one inbound frame; `Some` ends the connection
    async fn handle_frame(
        &self,
        frame: GatewayFrame,
        connection: &GatewayConnection,
        acked: &Arc<AtomicBool>,
    ) -> Option<ConnectionOutcome> {
        match frame.op {
            OpCode::Dispatch => {
                if let Some(seq) = frame.s {
                    self.sequence.observe(seq);
                }
                let raw = RawDispatch {
                    event: frame.t.unwrap_or_default(),
                    sequence: frame.s,
                    data: frame.d.unwrap_or(serde_json::Value::Null),
                };
                let starts_session = matches!(
                    EventType::from_name(&raw.event),
                    Some(EventType::Ready | EventType::Resumed)
                );

                // Strictly in arrival order: decode and cache mutation
                // complete here before the next frame is read
                if let Some(session) = self.dispatcher.dispatch(raw).await {
                    *self.session.lock() = Some(session);
                }

                if starts_session {
                    self.set_stage(ConnectionStage::Active);
                    self.connected.store(true, Ordering::SeqCst);
                }
                None
            }
            OpCode::Heartbeat => {
                // Server requested an immediate heartbeat; the periodic
                // timer keeps its cadence
                let beat = GatewayFrame::heartbeat(self.sequence.get());
                if connection.outbound.send(beat).await.is_err() {
                    return Some(ConnectionOutcome::Reconnect { resumable: true });
                }
                None
            }
            OpCode::HeartbeatAck => {
                acked.store(true, Ordering::SeqCst);
                None
            }
            OpCode::Reconnect => {
                tracing::info!("Server requested reconnect");
                Some(ConnectionOutcome::Reconnect { resumable: true })
            }
            OpCode::InvalidSession => {
                let resumable = frame.as_invalid_session().unwrap_or(false);
                tracing::info!(resumable, "Session invalidated by server");
                Some(ConnectionOutcome::Reconnect { resumable })
            }
            OpCode::Hello => None,
            other => {
                tracing::debug!(op = %other, "Ignoring unexpected opcode");
                None
            }
        }
    }

    /// Classify a socket close against the close-code table
    fn classify_close(&self, code: Option<u16>) -> Result<ConnectionOutcome, GatewayError> {
        match code.and_then(CloseCode::from_u16) {
            Some(known) if !known.should_reconnect() => {
                tracing::error!(code = %known, "Fatal gateway close");
                Err(GatewayError::FatalClose(known))
            }
            Some(known) => {
                tracing::warn!(code = %known, "Recoverable gateway close");
                Ok(ConnectionOutcome::Reconnect { resumable: true })
            }
            None => {
                // Unlisted codes default to reconnect-required
                tracing::warn!(code = ?code, "Gateway closed with unlisted code");
                Ok(ConnectionOutcome::Reconnect { resumable: true })
            }
        }
    }

    fn connect_url(&self) -> String {
        self.session
            .lock()
            .as_ref()
            .and_then(|session| session.resume_url.clone())
            .unwrap_or_else(|| self.config.gateway_url.clone())
    }

    fn identify_frame(&self) -> GatewayFrame {
        let payload = IdentifyPayload {
            token: self.config.token.clone(),
            intents: self.config.intents,
            properties: IdentifyProperties::from(&self.config.properties),
            shard: self.config.shard.map(ShardConfig::as_pair),
        };
        GatewayFrame::identify(&payload)
    }

    fn resume_frame(&self, session: &Session) -> GatewayFrame {
        let payload = ResumePayload {
            token: self.config.token.clone(),
            session_id: session.id.clone(),
            seq: self.sequence.get().unwrap_or(0),
        };
        GatewayFrame::resume(&payload)
    }
}

impl std::fmt::Debug for Shard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shard")
            .field("stage", &self.stage())
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use concord_cache::CacheState;
    use concord_core::Intents;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// One scripted connection: pre-seeded inbound events
    type Script = Vec<SocketEvent>;

    struct MockHandle {
        sent: Arc<Mutex<Vec<GatewayFrame>>>,
        push: mpsc::Sender<SocketEvent>,
    }

    /// Transport that replays scripted connections and records all frames
    /// the shard sends on each
    struct MockTransport {
        scripts: Mutex<VecDeque<Script>>,
        connections: Mutex<Vec<MockHandle>>,
    }

    impl MockTransport {
        fn new(scripts: Vec<Script>) -> Arc<Self> {
            Arc::new(Self {
                scripts: Mutex::new(scripts.into()),
                connections: Mutex::new(Vec::new()),
            })
        }

        fn connection_count(&self) -> usize {
            self.connections.lock().len()
        }

        fn sent(&self, index: usize) -> Vec<GatewayFrame> {
            self.connections
                .lock()
                .get(index)
                .map(|handle| handle.sent.lock().clone())
                .unwrap_or_default()
        }

        fn push(&self, index: usize, event: SocketEvent) {
            self.connections.lock()[index].push.try_send(event).unwrap();
        }
    }

    #[async_trait]
    impl GatewayTransport for MockTransport {
        async fn connect(&self, _url: &str) -> Result<GatewayConnection, TransportError> {
            let script = self
                .scripts
                .lock()
                .pop_front()
                .ok_or_else(|| TransportError::Connect(anyhow::anyhow!("no scripted connection")))?;

            let (outbound_tx, mut outbound_rx) = mpsc::channel::<GatewayFrame>(100);
            let (inbound_tx, inbound_rx) = mpsc::channel(100);

            let sent = Arc::new(Mutex::new(Vec::new()));
            let collector = sent.clone();
            let ack_tx = inbound_tx.clone();
            tokio::spawn(async move {
                while let Some(frame) = outbound_rx.recv().await {
                    // Behave like a live server: acknowledge heartbeats
                    if frame.op == OpCode::Heartbeat {
                        let ack = GatewayFrame {
                            op: OpCode::HeartbeatAck,
                            d: None,
                            s: None,
                            t: None,
                        };
                        let _ = ack_tx.try_send(SocketEvent::Frame(ack));
                    }
                    collector.lock().push(frame);
                }
            });

            for event in script {
                let _ = inbound_tx.try_send(event);
            }
            self.connections.lock().push(MockHandle {
                sent,
                push: inbound_tx,
            });

            Ok(GatewayConnection {
                outbound: outbound_tx,
                inbound: inbound_rx,
            })
        }
    }

    fn hello(interval_ms: u64) -> SocketEvent {
        SocketEvent::Frame(GatewayFrame {
            op: OpCode::Hello,
            d: Some(json!({"heartbeat_interval": interval_ms})),
            s: None,
            t: None,
        })
    }

    fn dispatch(event: &str, seq: u64, data: serde_json::Value) -> SocketEvent {
        SocketEvent::Frame(GatewayFrame {
            op: OpCode::Dispatch,
            d: Some(data),
            s: Some(seq),
            t: Some(event.to_string()),
        })
    }

    fn ready(session_id: &str, seq: u64) -> SocketEvent {
        dispatch(
            "READY",
            seq,
            json!({
                "user": {"id": "1", "username": "echo"},
                "session_id": session_id,
                "guilds": [],
            }),
        )
    }

    fn closed(code: u16) -> SocketEvent {
        SocketEvent::Closed(Some(code))
    }

    fn test_shard(transport: Arc<MockTransport>, intents: Intents) -> Arc<Shard> {
        let config = Arc::new(ClientConfig::new("test-token").with_intents(intents));
        let cache = Arc::new(CacheState::new(100, Duration::from_secs(60)));
        let dispatcher = Arc::new(EventDispatcher::new(cache, intents));
        Arc::new(Shard::new(config, transport, dispatcher))
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..500 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not met in time");
    }

    fn frames_with_op(frames: &[GatewayFrame], op: OpCode) -> usize {
        frames.iter().filter(|frame| frame.op == op).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_4004_is_terminal_and_never_reconnects() {
        let transport = MockTransport::new(vec![vec![hello(45_000), closed(4004)]]);
        let shard = test_shard(transport.clone(), Intents::GUILDS);

        let err = shard.run().await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::FatalClose(CloseCode::AuthenticationFailed)
        ));
        assert_eq!(shard.stage(), ConnectionStage::Terminal);

        // Exactly one connection was attempted, and it identified
        assert_eq!(transport.connection_count(), 1);
        wait_until(|| frames_with_op(&transport.sent(0), OpCode::Identify) == 1).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_4000_reconnects_and_resumes() {
        let transport = MockTransport::new(vec![
            vec![hello(45_000), ready("abc", 1), closed(4000)],
            vec![hello(45_000)],
        ]);
        let shard = test_shard(transport.clone(), Intents::GUILDS);

        let runner = shard.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        wait_until(|| {
            transport.connection_count() == 2
                && frames_with_op(&transport.sent(1), OpCode::Resume) == 1
        })
        .await;

        let resumes = transport.sent(1);
        let resume = resumes.iter().find(|f| f.op == OpCode::Resume).unwrap();
        let d = resume.d.as_ref().unwrap();
        assert_eq!(d["session_id"], "abc");
        assert_eq!(d["seq"], 1);
        // The second connection resumed rather than re-identifying
        assert_eq!(frames_with_op(&resumes, OpCode::Identify), 0);

        shard.disconnect();
        handle.await.unwrap().unwrap();
        assert_eq!(shard.stage(), ConnectionStage::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_session_not_resumable_reidentifies() {
        let invalid_session = SocketEvent::Frame(GatewayFrame {
            op: OpCode::InvalidSession,
            d: Some(json!(false)),
            s: None,
            t: None,
        });
        let transport = MockTransport::new(vec![
            vec![hello(45_000), ready("abc", 1), invalid_session],
            vec![hello(45_000)],
        ]);
        let shard = test_shard(transport.clone(), Intents::GUILDS);

        let runner = shard.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        wait_until(|| {
            transport.connection_count() == 2
                && frames_with_op(&transport.sent(1), OpCode::Identify) == 1
        })
        .await;
        assert_eq!(frames_with_op(&transport.sent(1), OpCode::Resume), 0);
        assert!(shard.session().is_none());

        shard.disconnect();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeats_carry_last_sequence() {
        let transport = MockTransport::new(vec![vec![hello(50), ready("abc", 3)]]);
        let shard = test_shard(transport.clone(), Intents::GUILDS);

        let runner = shard.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        wait_until(|| frames_with_op(&transport.sent(0), OpCode::Heartbeat) >= 2).await;

        let frames = transport.sent(0);
        let beat = frames.iter().find(|f| f.op == OpCode::Heartbeat).unwrap();
        assert_eq!(beat.d, Some(json!(3)));
        assert!(shard.is_connected());
        assert_eq!(shard.stage(), ConnectionStage::Active);

        shard.disconnect();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_heartbeat_request_is_answered_immediately() {
        // A long interval keeps the periodic task quiet during the test
        let transport = MockTransport::new(vec![vec![hello(600_000), ready("abc", 9)]]);
        let shard = test_shard(transport.clone(), Intents::GUILDS);

        let runner = shard.clone();
        let handle = tokio::spawn(async move { runner.run().await });
        wait_until(|| transport.connection_count() == 1 && shard.is_connected()).await;

        transport.push(
            0,
            SocketEvent::Frame(GatewayFrame {
                op: OpCode::Heartbeat,
                d: None,
                s: None,
                t: None,
            }),
        );
        wait_until(|| frames_with_op(&transport.sent(0), OpCode::Heartbeat) == 1).await;

        let frames = transport.sent(0);
        let beat = frames.iter().find(|f| f.op == OpCode::Heartbeat).unwrap();
        assert_eq!(beat.d, Some(json!(9)));

        shard.disconnect();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_connect_failure_is_fatal() {
        // No scripted connections: the very first connect errors
        let transport = MockTransport::new(vec![]);
        let shard = test_shard(transport, Intents::GUILDS);

        let err = shard.run().await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
        assert_eq!(shard.stage(), ConnectionStage::Terminal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_presence_requires_connection() {
        let transport = MockTransport::new(vec![vec![hello(600_000), ready("abc", 1)]]);
        let shard = test_shard(transport.clone(), Intents::GUILDS);

        assert!(matches!(
            shard.update_presence(OnlineStatus::Idle),
            Err(GatewayError::NotConnected)
        ));

        let runner = shard.clone();
        let handle = tokio::spawn(async move { runner.run().await });
        wait_until(|| shard.is_connected()).await;

        shard.update_presence(OnlineStatus::Idle).unwrap();
        wait_until(|| frames_with_op(&transport.sent(0), OpCode::PresenceUpdate) == 1).await;

        shard.disconnect();
        handle.await.unwrap().unwrap();
    }
}
