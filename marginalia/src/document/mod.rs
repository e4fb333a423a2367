//! Document metrics for the decoration renderer.
//!
//! The renderer needs to know how many lines the active file has *right now*
//! and how long each is. Those reads come off a dedicated background thread
//! that owns all filesystem access: `DocRequest` in via a crossbeam channel,
//! `AppEvent::DocMetrics` out via the event bus. The event loop itself never
//! touches the disk.

pub mod types;
pub mod worker;

use std::path::PathBuf;

use crossbeam_channel::Sender;
use tokio::sync::mpsc::UnboundedSender;

use crate::event::AppEvent;
use types::DocRequest;

/// Spawns the document worker thread and returns its request sender.
///
/// The thread exits when the returned sender (and all clones) are dropped.
pub fn spawn(root: PathBuf, event_tx: UnboundedSender<AppEvent>) -> Sender<DocRequest> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::spawn(move || worker::doc_worker_loop(root, rx, event_tx));
    tx
}
