//! Owned data types for the document background thread.
//!
//! Everything here is fully owned and `Send` so results can cross from the
//! worker thread to the event loop without lifetimes or arenas.

use marginalia_core::render::DocumentView;

/// A request for the document worker.
#[derive(Debug)]
pub enum DocRequest {
    /// Compute line metrics for a workspace-relative file.
    Metrics { file_name: String },
}

/// Line metrics for one document snapshot.
#[derive(Debug)]
pub struct DocMetrics {
    pub file_name: String,
    /// `None` when the file could not be read (deleted, permission denied) —
    /// the renderer treats that as "nothing to draw", not as a failure.
    pub index: Option<LineIndex>,
}

/// Per-line character lengths of a document snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    lengths: Vec<u32>,
}

impl LineIndex {
    /// Builds the index from full document text.
    ///
    /// A trailing newline yields a final empty line, matching how editors
    /// count lines; a trailing `\r` is not part of the line's length.
    pub fn from_text(text: &str) -> Self {
        Self {
            lengths: text
                .split('\n')
                .map(|line| line.trim_end_matches('\r').chars().count() as u32)
                .collect(),
        }
    }
}

impl DocumentView for LineIndex {
    fn line_count(&self) -> u32 {
        self.lengths.len() as u32
    }

    fn line_len(&self, line: u32) -> u32 {
        self.lengths.get(line as usize).copied().unwrap_or(0)
    }
}
