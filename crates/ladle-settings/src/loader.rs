//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`LadleSettings::default()`]
//! 2. If `~/.ladle/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `LADLE_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::LadleSettings;

/// Resolve the path to the settings file (`~/.ladle/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".ladle").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<LadleSettings> {
    let mut settings = load_settings_from_path(&settings_path())?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Load settings from a specific path. No env overrides are applied;
/// callers layer those on top explicitly.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<LadleSettings> {
    let defaults = serde_json::to_value(LadleSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
#[must_use]
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `LADLE_*` environment variable overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut LadleSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides using an arbitrary variable lookup.
///
/// Each variable has strict parsing rules:
/// - Integers must be valid and within the stated range
/// - Invalid values are silently ignored (fall back to file/default)
pub fn apply_overrides_from(
    settings: &mut LadleSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = read_string(&lookup, "LADLE_SERVER_URL") {
        settings.server.base_url = v;
    }
    if let Some(v) = read_string(&lookup, "LADLE_LOG_LEVEL") {
        settings.log_level = v;
    }
    if let Some(v) = read_u64(&lookup, "LADLE_CONNECT_TIMEOUT_MS", 100, 120_000) {
        settings.connection.connect_timeout_ms = v;
    }
    if let Some(v) = read_u64(&lookup, "LADLE_HEARTBEAT_INTERVAL_MS", 1_000, 600_000) {
        settings.connection.heartbeat_interval_ms = v;
    }
    if let Some(v) = read_u64(&lookup, "LADLE_RECONNECT_BASE_DELAY_MS", 100, 60_000) {
        settings.connection.reconnect_base_delay_ms = v;
    }
    if let Some(v) = read_u64(&lookup, "LADLE_RECONNECT_MAX_ATTEMPTS", 1, 100) {
        settings.connection.reconnect_max_attempts = v as u32;
    }
    if let Some(v) = read_u64(&lookup, "LADLE_LISTING_LIMIT", 1, 1_000) {
        settings.connection.listing_limit = v as usize;
    }
}

fn read_string(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn read_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    min: u64,
    max: u64,
) -> Option<u64> {
    lookup(name)?
        .parse::<u64>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
