//! Chat message and conversation models.
//!
//! Field names mirror the server's JSON exactly (`conversation_id`,
//! `updated_at`, …) so the listing and detail endpoints deserialize
//! directly into these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::ellipsize;

/// Character budget for a derived conversation title.
pub const TITLE_MAX_CHARS: usize = 50;
/// Character budget for a derived conversation preview.
pub const PREVIEW_MAX_CHARS: usize = 100;
/// Preview shown for a conversation with no messages.
pub const EMPTY_PREVIEW: &str = "No messages";
/// Title shown when neither metadata nor a user message supplies one.
pub const UNTITLED: &str = "New conversation";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human on this client.
    User,
    /// The recipe assistant.
    Assistant,
    /// Server-injected system content.
    System,
}

/// A web-search citation attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// URL of the cited source.
    pub url: String,
    /// Title of the cited source.
    pub title: String,
    /// Snippet from the source, when the server provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID.
    #[serde(default = "new_message_id")]
    pub message_id: String,
    /// Author role.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// When the message was created.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Citations (assistant messages only; empty otherwise).
    #[serde(default)]
    pub citations: Vec<Citation>,
}

fn new_message_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

impl ChatMessage {
    /// Build a user message (used for the optimistic local render).
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            message_id: new_message_id(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            citations: Vec::new(),
        }
    }

    /// Build an assistant message with its citations.
    #[must_use]
    pub fn assistant(content: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            message_id: new_message_id(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            citations,
        }
    }
}

/// Optional conversation metadata, as stored server-side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationMetadata {
    /// Explicit title, if the user or server set one.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A conversation summary: identity, metadata, and ordered messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID.
    pub conversation_id: String,
    /// Owner of the conversation.
    #[serde(default)]
    pub user_id: String,
    /// Messages in arrival order.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Metadata (title, tags).
    #[serde(default)]
    pub metadata: ConversationMetadata,
    /// Creation time.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last update time.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Derived display title.
    ///
    /// Explicit metadata title when present; otherwise the first user
    /// message truncated to [`TITLE_MAX_CHARS`] characters with an ellipsis
    /// marker; otherwise [`UNTITLED`].
    #[must_use]
    pub fn title(&self) -> String {
        if let Some(title) = &self.metadata.title {
            return title.clone();
        }
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map_or_else(|| UNTITLED.to_owned(), |m| ellipsize(&m.content, TITLE_MAX_CHARS))
    }

    /// Derived preview: the last message's content truncated to
    /// [`PREVIEW_MAX_CHARS`] characters, or [`EMPTY_PREVIEW`].
    #[must_use]
    pub fn preview(&self) -> String {
        self.messages
            .last()
            .map_or_else(|| EMPTY_PREVIEW.to_owned(), |m| {
                ellipsize(&m.content, PREVIEW_MAX_CHARS)
            })
    }
}

/// Listing response from `GET /api/conversations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationList {
    /// Conversations for the requesting user.
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    /// Total count reported by the server.
    #[serde(default)]
    pub total: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(messages: Vec<ChatMessage>) -> Conversation {
        Conversation {
            conversation_id: "c1".into(),
            user_id: "u1".into(),
            messages,
            metadata: ConversationMetadata::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn explicit_title_wins() {
        let mut conv = conversation(vec![ChatMessage::user("ignore me")]);
        conv.metadata.title = Some("Weeknight pasta".into());
        assert_eq!(conv.title(), "Weeknight pasta");
    }

    #[test]
    fn title_from_first_user_message_truncated() {
        let text = "Give me a vegan dinner idea for tonight that uses lentils and spinach";
        let conv = conversation(vec![ChatMessage::user(text)]);
        let expected: String = text.chars().take(TITLE_MAX_CHARS).collect::<String>() + "...";
        assert_eq!(conv.title(), expected);
        assert!(conv.title().ends_with("..."));
    }

    #[test]
    fn short_title_not_truncated() {
        let conv = conversation(vec![ChatMessage::user("Quick snack?")]);
        assert_eq!(conv.title(), "Quick snack?");
    }

    #[test]
    fn title_skips_assistant_messages() {
        let conv = conversation(vec![
            ChatMessage::assistant("Welcome!", vec![]),
            ChatMessage::user("Pad thai please"),
        ]);
        assert_eq!(conv.title(), "Pad thai please");
    }

    #[test]
    fn untitled_when_no_user_message() {
        let conv = conversation(vec![]);
        assert_eq!(conv.title(), UNTITLED);
    }

    #[test]
    fn preview_is_last_message() {
        let conv = conversation(vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("Try this lentil curry", vec![]),
        ]);
        assert_eq!(conv.preview(), "Try this lentil curry");
    }

    #[test]
    fn preview_truncates_long_content() {
        let long = "x".repeat(250);
        let conv = conversation(vec![ChatMessage::assistant(long, vec![])]);
        let preview = conv.preview();
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn preview_sentinel_when_empty() {
        let conv = conversation(vec![]);
        assert_eq!(conv.preview(), EMPTY_PREVIEW);
    }

    #[test]
    fn conversation_deserializes_server_json() {
        let json = r#"{
            "conversation_id": "c9",
            "user_id": "u1",
            "messages": [
                {"message_id": "m1", "role": "user", "content": "hi",
                 "timestamp": "2025-03-01T12:00:00Z"}
            ],
            "metadata": {"title": null, "tags": ["dinner"]},
            "created_at": "2025-03-01T12:00:00Z",
            "updated_at": "2025-03-01T12:05:00Z"
        }"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conv.conversation_id, "c9");
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.metadata.tags, vec!["dinner"]);
        assert!(conv.metadata.title.is_none());
    }

    #[test]
    fn listing_deserializes_with_missing_fields() {
        let list: ConversationList = serde_json::from_str(r#"{"conversations": []}"#).unwrap();
        assert!(list.conversations.is_empty());
        assert_eq!(list.total, 0);
    }

    #[test]
    fn citation_snippet_optional() {
        let c: Citation =
            serde_json::from_str(r#"{"url": "https://a.example", "title": "A"}"#).unwrap();
        assert!(c.snippet.is_none());
        let json = serde_json::to_string(&c).unwrap();
        assert!(!json.contains("snippet"));
    }
}
