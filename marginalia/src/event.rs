//! Event bus for the review host.
//!
//! All inbound wire commands, background-worker results, and store refreshes
//! are normalised into a single `AppEvent` enum and sent over a tokio
//! unbounded MPSC channel. The main loop receives from this channel and
//! dispatches accordingly — one event at a time, which is what makes the
//! whole host effectively serial.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use marginalia_core::store::Refresh;

use crate::document::types::DocMetrics;
use crate::wire::WebviewCommand;

/// All events the host can receive from any source.
///
/// Marked `#[non_exhaustive]` so that new variants added later (e.g. file
/// watching) do not break exhaustive match arms in existing handlers.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// A decoded command line from the editor glue.
    Command(WebviewCommand),
    /// Line metrics for a document, from the background worker.
    DocMetrics(DocMetrics),
    /// The store completed a durable write.
    StoreChanged,
    /// stdin closed or a shutdown was requested.
    Quit,
}

/// Holds the sender and receiver ends of the unified event channel.
///
/// The sender (`tx`) is cloned and distributed to producer tasks; the
/// receiver (`rx`) is owned by the main event loop.
pub struct EventHandler {
    /// Send half — clone this for each task that produces events.
    pub tx: mpsc::UnboundedSender<AppEvent>,
    /// Receive half — owned by the main loop.
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    /// Creates a new `EventHandler` with a fresh unbounded channel.
    ///
    /// Unbounded is appropriate here because the producers (stdin lines, one
    /// worker reply per request, one refresh per write) generate events at a
    /// bounded rate and the consumer always keeps up.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the tokio task that turns stdin lines into `AppEvent::Command`s.
///
/// Runs until stdin reaches EOF (the editor glue hung up) or a read error
/// occurs; both send `AppEvent::Quit` so the main loop exits cleanly.
/// Malformed lines are logged to stderr and dropped — send errors are
/// silently ignored because a dropped receiver means the loop already quit.
pub fn spawn_stdin_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<WebviewCommand>(line) {
                        Ok(command) => {
                            let _ = tx.send(AppEvent::Command(command));
                        }
                        Err(e) => eprintln!("marginalia: dropping malformed command: {e}"),
                    }
                }
                Ok(None) => {
                    let _ = tx.send(AppEvent::Quit);
                    break;
                }
                Err(e) => {
                    eprintln!("marginalia: stdin read error: {e}");
                    let _ = tx.send(AppEvent::Quit);
                    break;
                }
            }
        }
    });
}

/// Spawns the tokio task that forwards store refreshes onto the event bus.
///
/// The store fires one `Refresh` after each durable write; the main loop
/// reacts to the forwarded `StoreChanged` by refreshing the tree and
/// re-rendering decorations — strictly after the write, never before.
pub fn spawn_refresh_task(
    mut refresh_rx: mpsc::UnboundedReceiver<Refresh>,
    tx: mpsc::UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        while refresh_rx.recv().await.is_some() {
            let _ = tx.send(AppEvent::StoreChanged);
        }
    });
}
