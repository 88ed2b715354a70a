//! # ladle-core
//!
//! Foundation types and utilities for the Ladle chat client.
//!
//! This crate provides the shared vocabulary the other Ladle crates depend on:
//!
//! - **Client identity**: [`ids::ClientId`] newtype, generated once per profile
//! - **Connection state**: [`connection::ConnectionState`] lifecycle enum
//! - **Messages**: [`messages::ChatMessage`], [`messages::Conversation`] and
//!   the title/preview derivations the conversation list is rendered from
//! - **Wire frames**: [`frames::ClientFrame`] / [`frames::ServerFrame`] for
//!   the duplex chat channel
//! - **Backoff**: [`backoff::ReconnectPolicy`] exponential retry math
//! - **Errors**: [`errors::FrameError`], [`errors::SendError`] via `thiserror`
//! - **Text**: [`text`] character-safe truncation helpers
//! - **Logging**: [`logging::init_subscriber`] tracing bootstrap
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other ladle crates.

#![deny(unsafe_code)]

pub mod backoff;
pub mod connection;
pub mod errors;
pub mod frames;
pub mod ids;
pub mod logging;
pub mod messages;
pub mod text;
