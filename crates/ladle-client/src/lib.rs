//! # ladle-client
//!
//! Connection/session lifecycle manager for the Ladle chat client.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `identity` | Stable client identity, persisted across sessions |
//! | `transport` | Chat channel address derivation, connect, close classification |
//! | `heartbeat` | Periodic `ping` probing while connected |
//! | `dispatcher` | Inbound frame decoding and routing, pure state transitions |
//! | `cache` | Local mirror of server-known conversation summaries |
//! | `api` | HTTP listing/detail collaborator |
//! | `state` | Session state and the events the UI subscribes to |
//! | `session` | The session task: one socket, one ordered dispatch queue |
//!
//! ## Data flow
//!
//! Inbound: socket → `dispatcher` → (`state` mutation, `cache` refresh,
//! session events). Outbound: [`session::SessionHandle`] commands →
//! session task → socket.

#![deny(unsafe_code)]

pub mod api;
pub mod cache;
pub mod dispatcher;
pub mod heartbeat;
pub mod identity;
pub mod session;
pub mod state;
pub mod transport;

pub use session::{ChatSession, SessionCommand, SessionConfig, SessionHandle};
pub use state::SessionEvent;
