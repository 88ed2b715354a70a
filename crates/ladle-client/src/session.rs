//! The session task: one socket, one ordered dispatch queue.
//!
//! A single tokio task owns the socket, the session state, the cache, the
//! heartbeat, and the reconnect policy. Everything it does is serialized,
//! so frames are handled strictly in arrival order and cache replacement
//! is atomic with respect to event emission. The UI talks to it through a
//! cloneable [`SessionHandle`] (commands in, read-only cache views out)
//! and an event channel (state changes out).

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use ladle_core::backoff::ReconnectPolicy;
use ladle_core::connection::ConnectionState;
use ladle_core::errors::SendError;
use ladle_core::frames::ClientFrame;
use ladle_core::ids::ClientId;
use ladle_core::messages::Conversation;
use ladle_settings::LadleSettings;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::cache::ConversationCache;
use crate::dispatcher;
use crate::heartbeat::Heartbeat;
use crate::state::{SessionEvent, SessionState};
use crate::transport::{self, WsStream};

/// Commands queued ahead of a user send; beyond this, senders wait.
const COMMAND_BUFFER: usize = 64;

/// Session tuning, usually derived from settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HTTP(S) origin of the backend.
    pub base_url: String,
    /// Deadline for one connect attempt.
    pub connect_timeout: Duration,
    /// Cadence of `ping` probes while connected.
    pub heartbeat_interval: Duration,
    /// Base delay for exponential reconnect backoff.
    pub reconnect_base_delay: Duration,
    /// Maximum scheduled reconnect attempts.
    pub reconnect_max_attempts: u32,
    /// `limit` for conversation listing refreshes.
    pub listing_limit: usize,
}

impl SessionConfig {
    /// Build from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &LadleSettings) -> Self {
        let conn = &settings.connection;
        Self {
            base_url: settings.server.base_url.clone(),
            connect_timeout: Duration::from_millis(conn.connect_timeout_ms),
            heartbeat_interval: Duration::from_millis(conn.heartbeat_interval_ms),
            reconnect_base_delay: Duration::from_millis(conn.reconnect_base_delay_ms),
            reconnect_max_attempts: conn.reconnect_max_attempts,
            listing_limit: conn.listing_limit,
        }
    }
}

/// Operations the UI layer can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Send a chat message bound to the active conversation.
    SendMessage(String),
    /// Clear the active conversation and transcript.
    NewConversation,
    /// Switch to an existing conversation by id.
    OpenConversation(String),
    /// Explicitly (re)open the chat channel.
    Connect,
    /// Clean close: normal close code, timers cancelled, task ends.
    Shutdown,
}

/// Cloneable handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    cache: Arc<RwLock<ConversationCache>>,
}

impl SessionHandle {
    /// Send a chat message. Empty text is a no-op; while disconnected the
    /// send is rejected with a dismissible error event and a reconnect is
    /// attempted.
    pub async fn send_message(&self, text: impl Into<String>) {
        let _ = self
            .commands
            .send(SessionCommand::SendMessage(text.into()))
            .await;
    }

    /// Start a fresh conversation (clears the transcript).
    pub async fn new_conversation(&self) {
        let _ = self.commands.send(SessionCommand::NewConversation).await;
    }

    /// Switch to a conversation, replacing the transcript from the server.
    pub async fn open_conversation(&self, id: impl Into<String>) {
        let _ = self
            .commands
            .send(SessionCommand::OpenConversation(id.into()))
            .await;
    }

    /// Explicitly (re)open the chat channel; a no-op while already
    /// connected or connecting.
    pub async fn connect(&self) {
        let _ = self.commands.send(SessionCommand::Connect).await;
    }

    /// Cleanly shut the session down.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown).await;
    }

    /// Cached conversations, most recently updated first.
    #[must_use]
    pub fn conversations(&self) -> Vec<Conversation> {
        self.cache.read().recent().into_iter().cloned().collect()
    }

    /// Search cached conversations by derived title or preview,
    /// case-insensitively. An empty query returns everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Conversation> {
        self.cache.read().search(query).cloned().collect()
    }

    /// Look up one cached conversation.
    #[must_use]
    pub fn conversation(&self, id: &str) -> Option<Conversation> {
        self.cache.read().get(id).cloned()
    }
}

/// What the session loop should react to next.
enum Step {
    Command(Option<SessionCommand>),
    Socket(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
    HeartbeatTick,
    RetryDue,
}

/// The session task state. Constructed and consumed by [`ChatSession::spawn`].
pub struct ChatSession {
    client_id: ClientId,
    config: SessionConfig,
    api: ApiClient,
    state: SessionState,
    cache: Arc<RwLock<ConversationCache>>,
    policy: ReconnectPolicy,
    heartbeat: Heartbeat,
    socket: Option<WsStream>,
    retry_at: Option<Instant>,
    commands: mpsc::Receiver<SessionCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl ChatSession {
    /// Start a session task. Returns the command handle and the event
    /// stream the rendering adapter consumes.
    pub fn spawn(
        config: SessionConfig,
        client_id: ClientId,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cache = Arc::new(RwLock::new(ConversationCache::new()));

        let session = Self {
            api: ApiClient::new(&config.base_url),
            heartbeat: Heartbeat::new(config.heartbeat_interval),
            policy: ReconnectPolicy::new(
                config.reconnect_base_delay,
                config.reconnect_max_attempts,
            ),
            state: SessionState::new(),
            cache: Arc::clone(&cache),
            socket: None,
            retry_at: None,
            commands: commands_rx,
            events: events_tx,
            client_id,
            config,
        };
        let _ = tokio::spawn(session.run());

        (
            SessionHandle {
                commands: commands_tx,
                cache,
            },
            events_rx,
        )
    }

    async fn run(mut self) {
        self.refresh_cache_if_stale().await;
        self.open().await;

        loop {
            match self.next_step().await {
                // All handles dropped: same as an explicit shutdown.
                Step::Command(None) => {
                    self.shutdown().await;
                    break;
                }
                Step::Command(Some(command)) => {
                    if self.handle_command(command).await {
                        break;
                    }
                }
                Step::Socket(item) => self.on_socket_item(item).await,
                Step::HeartbeatTick => self.transmit(ClientFrame::Ping).await,
                Step::RetryDue => self.on_retry_due().await,
            }
        }
    }

    async fn next_step(&mut self) -> Step {
        let Self {
            socket,
            commands,
            heartbeat,
            retry_at,
            ..
        } = self;
        if let Some(socket) = socket.as_mut() {
            tokio::select! {
                command = commands.recv() => Step::Command(command),
                item = socket.next() => Step::Socket(item),
                () = heartbeat.tick() => Step::HeartbeatTick,
            }
        } else if let Some(deadline) = *retry_at {
            tokio::select! {
                command = commands.recv() => Step::Command(command),
                () = tokio::time::sleep_until(deadline) => Step::RetryDue,
            }
        } else {
            Step::Command(commands.recv().await)
        }
    }

    /// Returns `true` when the session should stop.
    async fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::SendMessage(text) => {
                self.send_chat(&text).await;
                false
            }
            SessionCommand::NewConversation => {
                for event in self.state.start_new_conversation() {
                    self.emit(event);
                }
                false
            }
            SessionCommand::OpenConversation(id) => {
                self.open_conversation(&id).await;
                false
            }
            SessionCommand::Connect => {
                self.open().await;
                false
            }
            SessionCommand::Shutdown => {
                self.shutdown().await;
                true
            }
        }
    }

    async fn send_chat(&mut self, text: &str) {
        match self.state.begin_send(text) {
            Ok((frame, events)) => {
                for event in events {
                    self.emit(event);
                }
                self.transmit(frame).await;
            }
            Err(SendError::EmptyMessage) => {}
            Err(error @ SendError::NotConnected { .. }) => {
                self.emit(SessionEvent::Error(error.to_string()));
                // A user-initiated send is an explicit trigger to re-open,
                // including after the reconnect budget was exhausted.
                self.open().await;
            }
        }
    }

    async fn transmit(&mut self, frame: ClientFrame) {
        let payload = match frame.encode() {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, "failed to encode outbound frame");
                return;
            }
        };
        let Some(socket) = self.socket.as_mut() else {
            return;
        };
        if let Err(error) = socket.send(Message::Text(payload.into())).await {
            warn!(%error, "send failed, treating connection as lost");
            self.on_connection_lost();
        }
    }

    async fn on_socket_item(
        &mut self,
        item: Option<Result<Message, tokio_tungstenite::tungstenite::Error>>,
    ) {
        match item {
            Some(Ok(Message::Text(text))) => {
                let outcome = dispatcher::dispatch_raw(&mut self.state, text.as_str());
                // Upsert before listeners hear about the reply, so the
                // active conversation resolves even if the refresh fails.
                for event in &outcome.events {
                    if let SessionEvent::AssistantMessage {
                        conversation_id, ..
                    } = event
                    {
                        self.cache.write().apply_event(conversation_id);
                    }
                }
                for event in outcome.events {
                    self.emit(event);
                }
                if outcome.refresh_cache {
                    self.refresh_cache().await;
                }
            }
            Some(Ok(Message::Close(frame))) => {
                let abnormal = transport::is_abnormal_close(frame.as_ref());
                info!(abnormal, "connection closed by server");
                self.socket = None;
                self.heartbeat.stop();
                self.cache.write().mark_stale();
                if let Some(event) = self.state.set_connection(ConnectionState::Disconnected) {
                    self.emit(event);
                }
                if abnormal {
                    self.schedule_retry();
                }
            }
            // Binary and ws-level ping/pong frames carry nothing for us.
            Some(Ok(_)) => {}
            Some(Err(error)) => {
                warn!(%error, "socket error");
                self.on_connection_lost();
            }
            None => {
                info!("connection dropped without close frame");
                self.on_connection_lost();
            }
        }
    }

    /// Abnormal termination: tear down and hand over to the retry policy.
    fn on_connection_lost(&mut self) {
        self.socket = None;
        self.heartbeat.stop();
        self.cache.write().mark_stale();
        if let Some(event) = self.state.set_connection(ConnectionState::Disconnected) {
            self.emit(event);
        }
        self.schedule_retry();
    }

    fn schedule_retry(&mut self) {
        match self.policy.next_delay() {
            Some(delay) => {
                debug!(attempt = self.policy.attempt(), ?delay, "scheduling reconnect");
                self.retry_at = Some(Instant::now() + delay);
            }
            None => {
                warn!("reconnect attempts exhausted, awaiting explicit trigger");
                self.retry_at = None;
            }
        }
    }

    async fn on_retry_due(&mut self) {
        self.retry_at = None;
        // Tie-break: a manual open may already have won the race.
        if self.socket.is_some() || self.state.connection == ConnectionState::Connecting {
            debug!("skipping scheduled reconnect, already connected or connecting");
            return;
        }
        self.open().await;
    }

    /// Open the chat channel. Idempotent: a no-op while already connected
    /// or connecting. Cancels any pending scheduled retry.
    async fn open(&mut self) {
        if self.socket.is_some() || self.state.connection == ConnectionState::Connecting {
            return;
        }
        self.retry_at = None;
        if let Some(event) = self.state.set_connection(ConnectionState::Connecting) {
            self.emit(event);
        }

        let url = match transport::endpoint_url(&self.config.base_url, &self.client_id) {
            Ok(url) => url,
            Err(error) => {
                // Configuration problem: retrying the same URL cannot help.
                warn!(%error, "cannot derive chat endpoint");
                self.emit(SessionEvent::Error(error.to_string()));
                if let Some(event) = self.state.set_connection(ConnectionState::Disconnected) {
                    self.emit(event);
                }
                return;
            }
        };

        match transport::connect(&url, self.config.connect_timeout).await {
            Ok(stream) => {
                self.socket = Some(stream);
                self.policy.reset();
                self.heartbeat.start();
                if let Some(event) = self.state.set_connection(ConnectionState::Connected) {
                    self.emit(event);
                }
                info!(%url, "chat channel connected");
                // The server may have appended messages while we were
                // away; re-sync the listing after a reconnect.
                self.refresh_cache_if_stale().await;
            }
            Err(error) => {
                warn!(%error, "connect failed");
                if let Some(event) = self.state.set_connection(ConnectionState::Disconnected) {
                    self.emit(event);
                }
                self.schedule_retry();
            }
        }
    }

    async fn open_conversation(&mut self, id: &str) {
        match self.api.get_conversation(id).await {
            Ok(conversation) => {
                for event in self.state.replace_transcript(&conversation) {
                    self.emit(event);
                }
            }
            Err(error) => {
                // Fetch failure leaves the prior transcript untouched.
                warn!(%error, conversation_id = id, "failed to load conversation");
                self.emit(SessionEvent::Error(format!(
                    "could not load conversation: {error}"
                )));
            }
        }
    }

    async fn refresh_cache_if_stale(&mut self) {
        let stale = self.cache.read().is_stale();
        if stale {
            self.refresh_cache().await;
        }
    }

    async fn refresh_cache(&mut self) {
        let listing = self
            .api
            .list_conversations(self.client_id.as_str(), Some(self.config.listing_limit))
            .await;
        match listing {
            Ok(list) => {
                // Replace wholesale in one synchronous step, then notify.
                let count = {
                    let mut cache = self.cache.write();
                    cache.replace_all(list.conversations);
                    cache.len()
                };
                self.emit(SessionEvent::ConversationsRefreshed { count });
            }
            Err(error) => {
                warn!(%error, "conversation listing refresh failed");
                self.emit(SessionEvent::Error(format!(
                    "could not refresh conversations: {error}"
                )));
            }
        }
    }

    /// Intentional teardown: normal close code, all timers cancelled.
    async fn shutdown(&mut self) {
        self.retry_at = None;
        self.heartbeat.stop();
        if let Some(mut socket) = self.socket.take() {
            let close = CloseFrame {
                code: CloseCode::Normal,
                reason: "client shutdown".into(),
            };
            if let Err(error) = socket.close(Some(close)).await {
                debug!(%error, "close handshake failed");
            }
        }
        if let Some(event) = self.state.set_connection(ConnectionState::Disconnected) {
            self.emit(event);
        }
        info!("session shut down");
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
