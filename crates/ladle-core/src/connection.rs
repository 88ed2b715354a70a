//! Connection lifecycle state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State of the duplex chat channel.
///
/// Exactly one value holds at any time. Transitions drive the UI status
/// indicator and gate outbound sends: only [`ConnectionState::Connected`]
/// accepts traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No socket; the session is idle or between reconnect attempts.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// The socket is open and sends are accepted.
    Connected,
}

impl ConnectionState {
    /// Whether outbound sends are accepted in this state.
    #[must_use]
    pub fn can_send(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(s)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
