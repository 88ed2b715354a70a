//! Local mirror of server-known conversation summaries.
//!
//! Rebuilt wholesale on every listing refresh. A new-message event only
//! ensures the touched id resolves and marks the cache stale — no
//! fine-grained patching from partial payloads, since the authoritative
//! message list lives server-side. Mutated only by the session task;
//! readers see each replacement atomically.

use std::collections::HashMap;

use chrono::Utc;
use ladle_core::messages::{Conversation, ConversationMetadata};

/// In-memory conversation-summary cache keyed by conversation id.
#[derive(Debug, Default)]
pub struct ConversationCache {
    entries: HashMap<String, Conversation>,
    stale: bool,
}

impl ConversationCache {
    /// Empty cache, marked stale so the first refresh always runs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            stale: true,
        }
    }

    /// Replace the whole cache from a listing response.
    ///
    /// The swap happens in one synchronous step; callers notify listeners
    /// only after this returns.
    pub fn replace_all(&mut self, conversations: Vec<Conversation>) {
        self.entries = conversations
            .into_iter()
            .map(|c| (c.conversation_id.clone(), c))
            .collect();
        self.stale = false;
    }

    /// Record that a server event touched `conversation_id`.
    ///
    /// Ensures the id resolves (a minimal entry is created on first
    /// reference) and marks the cache stale. No fine-grained patching from
    /// partial event payloads: the authoritative message list lives
    /// server-side, so the next listing refresh reconciles the contents.
    pub fn apply_event(&mut self, conversation_id: &str) {
        let now = Utc::now();
        let _ = self
            .entries
            .entry(conversation_id.to_owned())
            .or_insert_with(|| Conversation {
                conversation_id: conversation_id.to_owned(),
                user_id: String::new(),
                messages: Vec::new(),
                metadata: ConversationMetadata::default(),
                created_at: now,
                updated_at: now,
            });
        self.stale = true;
    }

    /// Mark the cache out of date without touching its contents.
    ///
    /// Set on connection loss: the server may have appended messages while
    /// the socket was down, so the next open re-syncs the listing. Entries
    /// stay readable until then.
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Whether a refresh is needed.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Look up one conversation.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.entries.get(id)
    }

    /// Number of cached conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no conversations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lazy, restartable search over derived titles and previews.
    ///
    /// Case-insensitive substring match; the empty query matches everything.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Conversation> + 'a {
        let needle = query.to_lowercase();
        self.entries.values().filter(move |c| {
            needle.is_empty()
                || c.title().to_lowercase().contains(&needle)
                || c.preview().to_lowercase().contains(&needle)
        })
    }

    /// All conversations, most recently updated first.
    #[must_use]
    pub fn recent(&self) -> Vec<&Conversation> {
        let mut all: Vec<&Conversation> = self.entries.values().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use ladle_core::messages::{ChatMessage, ConversationMetadata};

    use super::*;

    fn conversation(id: &str, first_user_message: &str) -> Conversation {
        Conversation {
            conversation_id: id.into(),
            user_id: "u1".into(),
            messages: vec![ChatMessage::user(first_user_message)],
            metadata: ConversationMetadata::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn new_cache_is_stale_and_empty() {
        let cache = ConversationCache::new();
        assert!(cache.is_stale());
        assert!(cache.is_empty());
    }

    #[test]
    fn replace_all_then_get_round_trips() {
        let mut cache = ConversationCache::new();
        let convs = vec![
            conversation("c1", "lentil soup"),
            conversation("c2", "pad thai"),
            conversation("c3", "shakshuka"),
        ];
        cache.replace_all(convs.clone());

        assert_eq!(cache.len(), 3);
        for conv in &convs {
            assert_eq!(cache.get(&conv.conversation_id), Some(conv));
        }
        assert!(!cache.is_stale());
    }

    #[test]
    fn replace_all_drops_absent_entries() {
        let mut cache = ConversationCache::new();
        cache.replace_all(vec![conversation("old", "gone soon")]);
        cache.replace_all(vec![conversation("new", "still here")]);
        assert!(cache.get("old").is_none());
        assert!(cache.get("new").is_some());
    }

    #[test]
    fn mark_stale_keeps_entries_readable() {
        let mut cache = ConversationCache::new();
        cache.replace_all(vec![conversation("c1", "soup")]);
        assert!(!cache.is_stale());

        cache.mark_stale();
        assert!(cache.is_stale());
        assert_eq!(cache.len(), 1);
        assert!(cache.get("c1").is_some());
    }

    #[test]
    fn apply_event_marks_stale_without_patching_messages() {
        let mut cache = ConversationCache::new();
        cache.replace_all(vec![conversation("c1", "soup")]);
        cache.apply_event("c1");

        // Contents untouched; the next refresh reconciles with the server.
        assert_eq!(cache.get("c1").unwrap().messages.len(), 1);
        assert!(cache.is_stale());
    }

    #[test]
    fn apply_event_creates_entry_on_first_reference() {
        let mut cache = ConversationCache::new();
        cache.replace_all(vec![conversation("c1", "soup")]);
        cache.apply_event("c-brand-new");

        // The event's conversation resolves even before the next refresh.
        assert!(cache.get("c-brand-new").is_some());
        assert_eq!(cache.len(), 2);
        assert!(cache.is_stale());
    }

    #[test]
    fn search_matches_title_case_insensitively() {
        let mut cache = ConversationCache::new();
        cache.replace_all(vec![
            conversation("c1", "Lentil soup ideas"),
            conversation("c2", "Pad thai tonight"),
        ]);
        let hits: Vec<_> = cache.search("LENTIL").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].conversation_id, "c1");
    }

    #[test]
    fn search_matches_preview() {
        let mut cache = ConversationCache::new();
        let mut conv = conversation("c1", "dinner");
        conv.messages
            .push(ChatMessage::assistant("Try a miso glaze", vec![]));
        cache.replace_all(vec![conv]);
        let hits: Vec<_> = cache.search("miso").collect();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn empty_query_returns_everything() {
        let mut cache = ConversationCache::new();
        cache.replace_all(vec![
            conversation("c1", "a"),
            conversation("c2", "b"),
            conversation("c3", "c"),
        ]);
        assert_eq!(cache.search("").count(), 3);
    }

    #[test]
    fn search_is_restartable() {
        let mut cache = ConversationCache::new();
        cache.replace_all(vec![conversation("c1", "soup")]);
        assert_eq!(cache.search("soup").count(), 1);
        // A second call over the same cache yields the same results.
        assert_eq!(cache.search("soup").count(), 1);
    }

    #[test]
    fn no_match_returns_empty() {
        let mut cache = ConversationCache::new();
        cache.replace_all(vec![conversation("c1", "soup")]);
        assert_eq!(cache.search("pizza").count(), 0);
    }

    #[test]
    fn recent_orders_by_updated_at_desc() {
        let mut cache = ConversationCache::new();
        let mut older = conversation("older", "a");
        older.updated_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut newer = conversation("newer", "b");
        newer.updated_at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        cache.replace_all(vec![older, newer]);

        let ids: Vec<&str> = cache
            .recent()
            .iter()
            .map(|c| c.conversation_id.as_str())
            .collect();
        assert_eq!(ids, vec!["newer", "older"]);
    }
}
