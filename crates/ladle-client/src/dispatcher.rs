//! Inbound frame routing.
//!
//! Frames are handled strictly in arrival order by the session task; this
//! module is the pure routing table. A malformed frame or unrecognized
//! `type` is logged and dropped — inbound corruption must never crash the
//! session.

use ladle_core::frames::ServerFrame;
use ladle_core::messages::ChatMessage;
use tracing::{debug, warn};

use crate::state::{SessionEvent, SessionState};

/// Result of routing one inbound frame.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Events to forward to the rendering adapter, in order.
    pub events: Vec<SessionEvent>,
    /// Whether the conversation cache must be reconciled with the server.
    pub refresh_cache: bool,
}

/// Decode and route a raw text frame.
///
/// Never fails: undecodable input produces an empty outcome.
pub fn dispatch_raw(state: &mut SessionState, raw: &str) -> DispatchOutcome {
    match ServerFrame::decode(raw) {
        Ok(frame) => dispatch(state, frame),
        Err(error) => {
            warn!(%error, "dropping malformed frame");
            DispatchOutcome::default()
        }
    }
}

/// Route a decoded frame to its effect.
pub fn dispatch(state: &mut SessionState, frame: ServerFrame) -> DispatchOutcome {
    match frame {
        ServerFrame::Status { message } => {
            let mut outcome = DispatchOutcome::default();
            if let Some(message) = message {
                debug!(%message, "server status");
                outcome.events.push(SessionEvent::Status(message));
            }
            outcome
        }
        // Already rendered optimistically at send time.
        ServerFrame::UserMessage => DispatchOutcome::default(),
        ServerFrame::Assistant(reply) => {
            let message = ChatMessage::assistant(reply.message, reply.citations);
            let events = state.adopt_reply(reply.conversation_id, message);
            DispatchOutcome {
                events,
                refresh_cache: true,
            }
        }
        ServerFrame::Error { error } => {
            let mut events: Vec<SessionEvent> = state.set_pending(false).into_iter().collect();
            events.push(SessionEvent::Error(error));
            DispatchOutcome {
                events,
                refresh_cache: false,
            }
        }
        ServerFrame::Pong => {
            debug!("pong received");
            DispatchOutcome::default()
        }
        ServerFrame::Unknown { frame_type } => {
            warn!(frame_type, "ignoring unrecognized frame type");
            DispatchOutcome::default()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
