//! # ladle-cli
//!
//! Interactive terminal client for the Ladle recipe assistant. Thin
//! rendering adapter: all connection and conversation logic lives in
//! `ladle-client`; this binary just maps session events to lines on
//! stdout and stdin lines to session commands.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ladle_client::identity::IdentityStore;
use ladle_client::{ChatSession, SessionConfig, SessionEvent, SessionHandle};
use ladle_core::connection::ConnectionState;
use ladle_core::messages::{ChatMessage, Conversation, Role};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

/// Ladle terminal chat client.
#[derive(Parser, Debug)]
#[command(name = "ladle", about = "Chat with the recipe assistant from the terminal")]
struct Cli {
    /// Backend origin, e.g. `http://127.0.0.1:8000` (overrides settings).
    #[arg(long)]
    server: Option<String>,

    /// Log level filter, e.g. `debug` (overrides settings).
    #[arg(long)]
    log_level: Option<String>,

    /// Path to the persisted client identity file.
    #[arg(long)]
    identity_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Settings: file, then env, then CLI flags on top.
    let settings_path = ladle_settings::settings_path();
    let mut settings =
        ladle_settings::load_settings_from_path(&settings_path).unwrap_or_default();
    ladle_settings::loader::apply_env_overrides(&mut settings);
    if let Some(server) = args.server {
        settings.server.base_url = server;
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }

    ladle_core::logging::init_subscriber(&settings.log_level);

    let identity_store = args
        .identity_file
        .map_or_else(|| IdentityStore::new(IdentityStore::default_path()), IdentityStore::new);
    let client_id = identity_store
        .load_or_create()
        .context("failed to load client identity")?;
    tracing::debug!(client_id = %client_id, "identity ready");

    let config = SessionConfig::from_settings(&settings);
    println!("ladle — connecting to {} as {client_id}", config.base_url);
    println!("type a message and press enter; /help lists commands");

    let (handle, mut events) = ChatSession::spawn(config, client_id);
    run_session(&handle, &mut events, BufReader::new(tokio::io::stdin())).await?;

    println!("bye");
    Ok(())
}

/// Drive the event/input loop until the session's event channel closes.
async fn run_session(
    handle: &SessionHandle,
    events: &mut UnboundedReceiver<SessionEvent>,
    input: impl AsyncBufRead + Unpin,
) -> Result<()> {
    let mut lines = input.lines();
    // Cleared on EOF so the input arm stops being polled; otherwise a
    // closed stdin yields `Ok(None)` immediately on every loop turn.
    let mut input_open = true;
    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(event) => render_event(&event),
                    None => break,
                }
            }
            line = lines.next_line(), if input_open => {
                match line.context("failed to read input")? {
                    Some(line) => {
                        if handle_line(handle, &line).await {
                            handle.shutdown().await;
                        }
                    }
                    // Input closed (piped input ended): one shutdown, then
                    // wait for the event channel to drain.
                    None => {
                        input_open = false;
                        handle.shutdown().await;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                handle.shutdown().await;
            }
        }
    }
    Ok(())
}

/// Apply one input line. Returns `true` when the user asked to quit.
async fn handle_line(handle: &SessionHandle, line: &str) -> bool {
    let line = line.trim();
    match line {
        "" => false,
        "/quit" | "/q" | "/exit" => true,
        "/help" => {
            print_help();
            false
        }
        "/new" => {
            handle.new_conversation().await;
            false
        }
        "/list" => {
            print_listing(&handle.conversations());
            false
        }
        "/retry" => {
            handle.connect().await;
            false
        }
        _ => {
            if let Some(query) = line.strip_prefix("/search") {
                print_listing(&handle.search(query.trim()));
            } else if let Some(id) = line.strip_prefix("/open") {
                let id = id.trim();
                if id.is_empty() {
                    println!("usage: /open <conversation-id>");
                } else {
                    handle.open_conversation(id).await;
                }
            } else if line.starts_with('/') {
                println!("unknown command: {line} (/help lists commands)");
            } else {
                handle.send_message(line).await;
            }
            false
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  /new            start a fresh conversation");
    println!("  /list           list cached conversations");
    println!("  /search <text>  search conversations by title or preview");
    println!("  /open <id>      open a conversation");
    println!("  /retry          reconnect to the server");
    println!("  /quit           exit");
}

fn print_listing(conversations: &[Conversation]) {
    if conversations.is_empty() {
        println!("(no conversations)");
        return;
    }
    for conv in conversations {
        println!(
            "  {}  {}  — {}",
            conv.conversation_id,
            conv.title(),
            conv.preview()
        );
    }
}

fn render_event(event: &SessionEvent) {
    match event {
        SessionEvent::Connection(state) => match state {
            ConnectionState::Connecting => println!("· connecting..."),
            ConnectionState::Connected => println!("· connected"),
            ConnectionState::Disconnected => println!("· disconnected"),
        },
        SessionEvent::UserMessage(message) => render_message(message),
        SessionEvent::AssistantMessage { message, .. } => render_message(message),
        SessionEvent::Pending(true) => println!("· assistant is thinking..."),
        SessionEvent::Pending(false) => {}
        SessionEvent::Status(status) => println!("· {status}"),
        SessionEvent::Error(error) => println!("! {error}"),
        SessionEvent::TranscriptReplaced {
            conversation_id,
            messages,
        } => {
            match conversation_id {
                Some(id) => println!("· opened conversation {id}"),
                None => println!("· new conversation"),
            }
            for message in messages {
                render_message(message);
            }
        }
        SessionEvent::ConversationsRefreshed { count } => {
            tracing::debug!(count, "conversation cache refreshed");
        }
    }
}

fn render_message(message: &ChatMessage) {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "chef",
        Role::System => "system",
    };
    println!("{speaker}> {}", message.content);
    for citation in &message.citations {
        println!("        [{}] {}", citation.title, citation.url);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
