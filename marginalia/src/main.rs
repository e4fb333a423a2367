//! marginalia — review-annotation host.
//!
//! Entry point for the `marginalia` binary. Wires together the stdio wire
//! protocol (`wire`), unified event bus (`event`), review session state
//! (`session`), command handling (`handler`), and the document-metrics
//! worker thread (`document`). Durable storage lives in `marginalia-core`.
//!
//! # Startup sequence (order matters)
//!
//! 1. Load config from XDG config — read-only, safe before anything else.
//! 2. Register the SIGTERM flag — polled in the event loop's heartbeat arm.
//! 3. Bootstrap the store documents before the first command is read, so
//!    there is no "loading" state to manage.
//! 4. Spawn the document worker thread, the stdin task, and the refresh
//!    forwarder; then enter the event loop.
//!
//! # Protocol discipline
//!
//! stdout carries the line-oriented JSON protocol to the editor glue and
//! nothing else; every diagnostic goes to stderr. Mixing the two would
//! corrupt the byte stream the glue is parsing.

mod document;
mod event;
mod handler;
mod session;
mod wire;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use marginalia_core::store::CommentStore;
use tokio::sync::mpsc;

/// Returns the path to the marginalia config file.
///
/// Prefers `$XDG_CONFIG_HOME/marginalia/config.toml`; falls back to
/// `~/.config/marginalia/config.toml` when the env var is absent.
fn config_path() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(std::path::PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| std::path::PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| std::path::PathBuf::from(".config"));
    base.join("marginalia").join("config.toml")
}

/// Loads the store directory name from the config file.
///
/// Returns `".marginalia"` if the file does not exist, cannot be parsed, or
/// has no `store_dir` key. Never panics — config errors are soft failures
/// printed to stderr.
fn load_store_dir() -> String {
    let path = config_path();
    let raw = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(_) => return ".marginalia".to_owned(),
    };
    let table: toml::Table = match toml::from_str(&raw) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("marginalia: config parse error in {:?}: {}", path, e);
            return ".marginalia".to_owned();
        }
    };
    table
        .get("store_dir")
        .and_then(|v| v.as_str())
        .unwrap_or(".marginalia")
        .to_owned()
}

/// Registers a SIGTERM handler that sets an `AtomicBool` flag.
///
/// The flag is polled in the event loop's 50 ms heartbeat arm and after
/// every event, so quit latency is at most one event cycle.
///
/// # Panics
///
/// Panics if the OS refuses to register the signal handler (extremely rare —
/// treated as a fatal initialisation error rather than a recoverable
/// condition).
fn register_sigterm() -> Arc<AtomicBool> {
    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&term))
        .expect("Failed to register SIGTERM handler");
    term
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Step 0: load config — read-only, soft-failing.
    let store_dir = load_store_dir();

    // Step 1: SIGTERM flag — polled in the 50ms heartbeat arm below.
    let term_flag = register_sigterm();

    // Step 2: the workspace is whatever directory the glue launched us in;
    // every stored path is relative to it.
    let root = std::env::current_dir()?;

    // Step 3: build the store and bootstrap its documents before the first
    // command so the first read never races the skeleton write.
    let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
    let mut store = CommentStore::new(root.join(&store_dir));
    store.attach_refresh(refresh_tx);
    store
        .bootstrap()
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    // Step 4: event channel plus its producers — stdin commands, store
    // refreshes, and the document worker thread.
    let handler_events = event::EventHandler::new();
    event::spawn_stdin_task(handler_events.tx.clone());
    event::spawn_refresh_task(refresh_rx, handler_events.tx.clone());
    let doc_tx = document::spawn(root, handler_events.tx.clone());
    let mut rx = handler_events.rx;

    let mut session = session::ReviewSession::default();

    // Event loop — exits only via `break`, never via `?`, so shutdown always
    // reaches the single exit point below.
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: guarantees SIGTERM is checked at least every 50ms,
            // even when no command arrives. Without this arm, an idle host
            // blocks forever in rx.recv() and the flag is never polled.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event::AppEvent::Command(command)) => {
                        let flow = handler::handle_command(
                            command, &mut session, &store, &doc_tx,
                        )
                        .await;
                        if flow == handler::Flow::Quit {
                            break 'event_loop;
                        }
                    }
                    Some(event::AppEvent::DocMetrics(metrics)) => {
                        handler::handle_doc_metrics(metrics, &mut session, &store).await;
                    }
                    Some(event::AppEvent::StoreChanged) => {
                        handler::handle_store_changed(&session, &doc_tx);
                    }
                    Some(event::AppEvent::Quit) | None => break 'event_loop,
                    _ => {}
                }
                // Check SIGTERM after every event too, not just on the
                // heartbeat, so quit latency is at most one event cycle.
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    Ok(())
}
