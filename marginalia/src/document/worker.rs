//! Background thread that owns filesystem reads for document metrics.
//!
//! All communication is via channels: `DocRequest` in, `AppEvent::DocMetrics`
//! out. The thread runs until the request channel closes (sender dropped).

use std::path::PathBuf;

use crossbeam_channel::Receiver;
use tokio::sync::mpsc::UnboundedSender;

use super::types::{DocMetrics, DocRequest, LineIndex};
use crate::event::AppEvent;

/// Entry point for the document worker thread.
///
/// One metrics reply is sent per request, in request order. An unreadable
/// file degrades to `index: None` rather than an error — the event loop
/// clears that document's decorations and moves on. Send errors are ignored:
/// a dropped event receiver means the host is shutting down.
pub fn doc_worker_loop(
    root: PathBuf,
    rx: Receiver<DocRequest>,
    event_tx: UnboundedSender<AppEvent>,
) {
    for request in rx {
        match request {
            DocRequest::Metrics { file_name } => {
                let index = std::fs::read_to_string(root.join(&file_name))
                    .ok()
                    .map(|text| LineIndex::from_text(&text));
                let _ = event_tx.send(AppEvent::DocMetrics(DocMetrics { file_name, index }));
            }
        }
    }
}
