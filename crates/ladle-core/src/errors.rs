//! Shared error types for frame decoding and send gating.
//!
//! Transport-, fetch-, and identity-level errors live next to the code that
//! produces them in `ladle-client`; the variants here are the ones the pure
//! state machinery needs.

use thiserror::Error;

use crate::connection::ConnectionState;

/// Failure to decode an inbound frame.
///
/// Inbound corruption must never crash the session: the dispatcher logs
/// these and drops the frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame was not valid JSON.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The frame was valid JSON but its `data` payload had the wrong shape.
    #[error("invalid `{frame_type}` payload: {reason}")]
    Payload {
        /// The frame's declared `type` tag.
        frame_type: &'static str,
        /// What was wrong with the payload.
        reason: String,
    },
}

/// An outbound send was rejected before anything was transmitted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The message was empty after trimming; callers treat this as a no-op.
    #[error("message is empty")]
    EmptyMessage,

    /// Sends are rejected (not queued) while the channel is not connected.
    #[error("cannot send while {state}")]
    NotConnected {
        /// State the connection was in when the send was attempted.
        state: ConnectionState,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_error_messages() {
        assert_eq!(SendError::EmptyMessage.to_string(), "message is empty");
        let err = SendError::NotConnected {
            state: ConnectionState::Connecting,
        };
        assert_eq!(err.to_string(), "cannot send while connecting");
    }

    #[test]
    fn frame_error_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let frame_err = FrameError::from(err);
        assert!(frame_err.to_string().starts_with("malformed frame"));
    }
}
