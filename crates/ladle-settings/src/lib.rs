//! # ladle-settings
//!
//! Configuration management with layered sources for the Ladle client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`LadleSettings::default()`]
//! 2. **User file** — `~/.ladle/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `LADLE_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use ladle_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("server: {}", settings.server.base_url);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::{ConnectionSettings, LadleSettings, ServerSettings};

use std::sync::OnceLock;

/// Global settings singleton, initialized on first access.
static SETTINGS: OnceLock<LadleSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.ladle/settings.json` with env var
/// overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
pub fn get_settings() -> &'static LadleSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
pub fn init_settings(settings: LadleSettings) -> std::result::Result<(), LadleSettings> {
    SETTINGS.set(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
