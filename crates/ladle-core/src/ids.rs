//! Stable client identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque client identifier used as the routing key for the chat channel.
///
/// Generated once per profile (UUIDv7) and persisted by the identity store;
/// it is never regenerated while the stored copy exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// The identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClientId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_unique() {
        let a = ClientId::generate();
        let b = ClientId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn display_matches_inner() {
        let id = ClientId::from("user_42");
        assert_eq!(id.to_string(), "user_42");
        assert_eq!(id.as_str(), "user_42");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ClientId::from("abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: ClientId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
