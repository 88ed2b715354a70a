//! Session state and the events the UI layer subscribes to.
//!
//! State transitions are pure functions over [`SessionState`]; the session
//! task applies them and forwards the returned [`SessionEvent`]s to the
//! rendering adapter. No I/O happens here.

use ladle_core::connection::ConnectionState;
use ladle_core::errors::SendError;
use ladle_core::frames::ClientFrame;
use ladle_core::messages::{ChatMessage, Conversation};

/// State-change notification consumed by the rendering adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The connection state changed.
    Connection(ConnectionState),
    /// A user message was rendered optimistically.
    UserMessage(ChatMessage),
    /// The assistant replied.
    AssistantMessage {
        /// Conversation the reply belongs to (now the active one).
        conversation_id: String,
        /// The reply, citations included.
        message: ChatMessage,
    },
    /// The pending/typing indicator toggled.
    Pending(bool),
    /// Informational status line from the server.
    Status(String),
    /// Dismissible error notification; the session stays usable.
    Error(String),
    /// The rendered transcript was replaced wholesale.
    TranscriptReplaced {
        /// New active conversation, or `None` for a fresh one.
        conversation_id: Option<String>,
        /// The replacement transcript.
        messages: Vec<ChatMessage>,
    },
    /// The conversation cache was rebuilt from the listing endpoint.
    ConversationsRefreshed {
        /// Number of cached conversations after the rebuild.
        count: usize,
    },
}

/// Mutable session state owned by the session task.
#[derive(Debug)]
pub struct SessionState {
    /// Current connection state.
    pub connection: ConnectionState,
    /// Conversation new outbound messages are bound to, if any.
    pub active_conversation: Option<String>,
    /// Locally rendered transcript.
    pub transcript: Vec<ChatMessage>,
    /// Whether a reply is pending (typing indicator).
    pub pending: bool,
}

impl SessionState {
    /// Fresh state: disconnected, no active conversation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            active_conversation: None,
            transcript: Vec::new(),
            pending: false,
        }
    }

    /// Transition the connection state, reporting the change.
    pub fn set_connection(&mut self, next: ConnectionState) -> Option<SessionEvent> {
        if self.connection == next {
            return None;
        }
        self.connection = next;
        Some(SessionEvent::Connection(next))
    }

    /// Toggle the pending indicator, reporting the change.
    pub fn set_pending(&mut self, pending: bool) -> Option<SessionEvent> {
        if self.pending == pending {
            return None;
        }
        self.pending = pending;
        Some(SessionEvent::Pending(pending))
    }

    /// Validate and stage an outbound chat message.
    ///
    /// Empty (after trimming) is a silent no-op for callers. Sends are
    /// rejected — never queued — while not connected, and in that case the
    /// transcript is left untouched. On success the user message has
    /// already been appended (optimistic render) and the returned frame
    /// carries the active conversation id.
    pub fn begin_send(&mut self, text: &str) -> Result<(ClientFrame, Vec<SessionEvent>), SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if !self.connection.can_send() {
            return Err(SendError::NotConnected {
                state: self.connection,
            });
        }

        let message = ChatMessage::user(text);
        self.transcript.push(message.clone());
        let mut events = vec![SessionEvent::UserMessage(message)];
        events.extend(self.set_pending(true));

        let frame = ClientFrame::chat(text, self.active_conversation.clone());
        Ok((frame, events))
    }

    /// Clear the active conversation and transcript for a fresh start.
    pub fn start_new_conversation(&mut self) -> Vec<SessionEvent> {
        self.active_conversation = None;
        self.transcript.clear();
        let mut events = vec![SessionEvent::TranscriptReplaced {
            conversation_id: None,
            messages: Vec::new(),
        }];
        events.extend(self.set_pending(false));
        events
    }

    /// Replace the transcript with a fetched conversation.
    pub fn replace_transcript(&mut self, conversation: &Conversation) -> Vec<SessionEvent> {
        self.active_conversation = Some(conversation.conversation_id.clone());
        self.transcript = conversation.messages.clone();
        let mut events = vec![SessionEvent::TranscriptReplaced {
            conversation_id: self.active_conversation.clone(),
            messages: self.transcript.clone(),
        }];
        events.extend(self.set_pending(false));
        events
    }

    /// Adopt an assistant reply: bind to its conversation, append the
    /// message, clear the pending indicator.
    ///
    /// The reply's conversation id is adopted unconditionally, even when
    /// the user has navigated elsewhere since the request was sent (there
    /// is no correlation token to detect staleness; see DESIGN.md).
    pub fn adopt_reply(
        &mut self,
        conversation_id: String,
        message: ChatMessage,
    ) -> Vec<SessionEvent> {
        self.active_conversation = Some(conversation_id.clone());
        self.transcript.push(message.clone());
        let mut events = Vec::new();
        events.extend(self.set_pending(false));
        events.push(SessionEvent::AssistantMessage {
            conversation_id,
            message,
        });
        events
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
