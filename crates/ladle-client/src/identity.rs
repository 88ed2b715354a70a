//! Persistent client identity.
//!
//! One stable identity string per profile, stored in a plain file. The
//! identity is the routing key for the chat channel endpoint, so it must
//! never change while the stored copy exists; clearing the file is the
//! only way to get a new one.

use std::path::{Path, PathBuf};

use ladle_core::ids::ClientId;
use thiserror::Error;
use tracing::{debug, info};

/// Failure reading or writing the identity file.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Filesystem error with the offending path.
    #[error("identity file {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// File-backed identity store.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    /// Store backed by a specific file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `~/.ladle/identity`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".ladle").join("identity")
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored identity, generating and persisting one on first use.
    ///
    /// An existing non-empty file always wins; its contents are returned
    /// verbatim (trimmed) and never rewritten.
    pub fn load_or_create(&self) -> Result<ClientId, IdentityError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    debug!(path = %self.path.display(), "loaded existing client identity");
                    return Ok(ClientId::from(trimmed));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(IdentityError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        }

        let id = ClientId::generate();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| IdentityError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, id.as_str()).map_err(|source| IdentityError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "generated new client identity");
        Ok(id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
