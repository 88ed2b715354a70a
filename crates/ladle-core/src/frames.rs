//! Wire frames for the duplex chat channel.
//!
//! Outbound frames are flat: `{"type":"chat","message":…,"conversation_id":…}`
//! and `{"type":"ping"}`. Inbound frames carry a `type` tag plus a `data`
//! payload whose shape depends on the tag, so decoding goes through a raw
//! envelope first rather than a serde-tagged enum.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::FrameError;
use crate::messages::Citation;

/// Outbound frame, client → server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// A user chat message, optionally bound to an existing conversation.
    Chat {
        /// The user's message text.
        message: String,
        /// Target conversation, or `None` to start a new one server-side.
        conversation_id: Option<String>,
    },
    /// Liveness probe; the server answers with a `pong` frame.
    Ping,
}

impl ClientFrame {
    /// Build a chat frame.
    #[must_use]
    pub fn chat(message: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self::Chat {
            message: message.into(),
            conversation_id,
        }
    }

    /// Encode to the JSON wire form.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Payload of an `assistant_message` frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssistantReply {
    /// Assistant response text.
    pub message: String,
    /// Conversation the reply belongs to (the server allocates one for
    /// messages sent without a conversation id).
    pub conversation_id: String,
    /// Web-search citations, possibly empty.
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Inbound frame, server → client, routed by its `type` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// Informational status text (sent on connect, for example).
    Status {
        /// Human-readable status line, when present.
        message: Option<String>,
    },
    /// Echo of the user's own message; already rendered optimistically.
    UserMessage,
    /// The assistant's reply.
    Assistant(AssistantReply),
    /// Server-reported error.
    Error {
        /// Error description.
        error: String,
    },
    /// Answer to a `ping`; informational only.
    Pong,
    /// A `type` this client does not recognize. Logged and ignored.
    Unknown {
        /// The unrecognized tag.
        frame_type: String,
    },
}

/// Raw inbound envelope before the `type` tag is interpreted.
#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    frame_type: String,
    #[serde(default)]
    data: Value,
}

impl ServerFrame {
    /// Decode a raw text frame.
    ///
    /// Unrecognized `type` tags decode successfully to [`ServerFrame::Unknown`];
    /// only malformed JSON or a malformed payload for a known tag is an error.
    pub fn decode(raw: &str) -> Result<Self, FrameError> {
        let frame: RawFrame = serde_json::from_str(raw)?;
        match frame.frame_type.as_str() {
            "status" => Ok(Self::Status {
                message: frame
                    .data
                    .get("message")
                    .and_then(Value::as_str)
                    .map(String::from),
            }),
            "user_message" => Ok(Self::UserMessage),
            "assistant_message" => {
                let reply: AssistantReply =
                    serde_json::from_value(frame.data).map_err(|e| FrameError::Payload {
                        frame_type: "assistant_message",
                        reason: e.to_string(),
                    })?;
                Ok(Self::Assistant(reply))
            }
            "error" => {
                let error = frame
                    .data
                    .get("error")
                    .and_then(Value::as_str)
                    .ok_or_else(|| FrameError::Payload {
                        frame_type: "error",
                        reason: "missing `error` field".into(),
                    })?;
                Ok(Self::Error {
                    error: error.to_owned(),
                })
            }
            "pong" => Ok(Self::Pong),
            other => Ok(Self::Unknown {
                frame_type: other.to_owned(),
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
