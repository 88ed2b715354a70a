//! Settings type definitions and compiled defaults.

use serde::{Deserialize, Serialize};

/// Default backend origin.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Default heartbeat cadence in milliseconds.
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 30_000;
/// Default connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Default base delay for reconnect backoff in milliseconds.
pub const DEFAULT_RECONNECT_BASE_DELAY_MS: u64 = 1_000;
/// Default cap on scheduled reconnect attempts.
pub const DEFAULT_RECONNECT_MAX_ATTEMPTS: u32 = 5;
/// Default `limit` sent to the conversation listing endpoint.
pub const DEFAULT_LISTING_LIMIT: usize = 50;

/// Top-level Ladle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadleSettings {
    /// Settings schema version.
    pub version: String,
    /// Minimum log level (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
    /// Backend endpoint settings.
    pub server: ServerSettings,
    /// Connection lifecycle tuning.
    pub connection: ConnectionSettings,
}

impl Default for LadleSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".into(),
            log_level: "info".into(),
            server: ServerSettings::default(),
            connection: ConnectionSettings::default(),
        }
    }
}

/// Backend endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// HTTP(S) origin of the backend. The chat channel address is derived
    /// from this (`http` → `ws`, `https` → `wss`).
    pub base_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

/// Connection lifecycle tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// How long a connect attempt may take before it is abandoned.
    pub connect_timeout_ms: u64,
    /// Cadence of `ping` probes while connected.
    pub heartbeat_interval_ms: u64,
    /// Base delay for exponential reconnect backoff.
    pub reconnect_base_delay_ms: u64,
    /// Maximum scheduled reconnect attempts before giving up.
    pub reconnect_max_attempts: u32,
    /// `limit` parameter for conversation listing refreshes.
    pub listing_limit: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
            reconnect_base_delay_ms: DEFAULT_RECONNECT_BASE_DELAY_MS,
            reconnect_max_attempts: DEFAULT_RECONNECT_MAX_ATTEMPTS,
            listing_limit: DEFAULT_LISTING_LIMIT,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
