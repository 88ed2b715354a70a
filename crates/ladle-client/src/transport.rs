//! Chat channel transport: address derivation, connect, close classification.
//!
//! Thin layer over `tokio-tungstenite`. The session loop owns the stream;
//! this module only knows how to derive the endpoint address from the
//! backend origin, open a socket with a bounded timeout, and decide whether
//! a close was clean.

use std::time::Duration;

use ladle_core::ids::ClientId;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// The socket type the session loop owns.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport-level failure.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The configured base URL could not be turned into a channel address.
    #[error("invalid server url `{url}`: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The socket could not be opened.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The connect attempt exceeded its deadline.
    #[error("connect timed out after {timeout_ms} ms")]
    Timeout {
        /// The deadline that was exceeded.
        timeout_ms: u64,
    },
}

/// Derive the chat channel address for a client from the backend origin.
///
/// `http` upgrades to `ws` and `https` to `wss`, mirroring the origin's
/// transport security. Already-websocket schemes pass through.
pub fn endpoint_url(base_url: &str, client_id: &ClientId) -> Result<String, TransportError> {
    let (scheme, rest) = base_url
        .split_once("://")
        .ok_or(TransportError::InvalidUrl {
            url: base_url.to_owned(),
            reason: "missing scheme",
        })?;
    let ws_scheme = match scheme {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => {
            return Err(TransportError::InvalidUrl {
                url: base_url.to_owned(),
                reason: "unsupported scheme",
            });
        }
    };
    let host = rest.trim_end_matches('/');
    if host.is_empty() {
        return Err(TransportError::InvalidUrl {
            url: base_url.to_owned(),
            reason: "missing host",
        });
    }
    Ok(format!("{ws_scheme}://{host}/ws/chat/{client_id}"))
}

/// Open the chat channel, bounded by `timeout`.
pub async fn connect(url: &str, timeout: Duration) -> Result<WsStream, TransportError> {
    let attempt = connect_async(url);
    let (stream, _response) = tokio::time::timeout(timeout, attempt)
        .await
        .map_err(|_| TransportError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        })?
        .map_err(|e| TransportError::Connect(e.to_string()))?;
    Ok(stream)
}

/// Whether a received close should trigger the reconnection policy.
///
/// Only a close frame carrying the reserved "normal" code counts as clean;
/// any other code, or the peer dropping without a close frame at all, is
/// abnormal.
#[must_use]
pub fn is_abnormal_close(frame: Option<&CloseFrame>) -> bool {
    match frame {
        Some(f) => f.code != CloseCode::Normal,
        None => true,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
