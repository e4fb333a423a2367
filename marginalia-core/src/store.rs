//! Durable CRUD over the persisted review documents.
//!
//! Every mutation follows the same shape: take the write gate, read the whole
//! document, mutate in memory, write the whole document back, release the
//! gate, then fire one [`Refresh`] on the registered channel. The refresh is
//! sent strictly after the durable write completes, so an observer that
//! re-reads on refresh always sees the new state.
//!
//! The whole-file read-modify-write is sound only because this process is the
//! single writer: the gate serializes commands dispatched within the process,
//! and nothing else writes the store directory. Porting this store into a
//! multi-process or multi-tab setup requires a transactional write (for
//! example write-temp-then-rename) first.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::schema::{
    self, GeneralDocument, InlineDocument, RubricsDocument, GENERAL_COMMENTS_FILE,
    INLINE_COMMENTS_FILE, RUBRICS_FILE,
};
use crate::types::{GeneralComment, GeneralDraft, InlineComment, Priority, Rubric, Span};

/// Confirmation prompt shown before a delete is carried out.
pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this comment? This cannot be undone.";

/// Fired on the refresh channel after every completed durable write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refresh;

/// Outcome of an update or remove that cannot crash.
///
/// `Unchanged` and `NotFound` are silent no-ops: no write happened and no
/// refresh was fired. Callers turn them into informational messages at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// The store was mutated and a refresh was fired.
    Applied,
    /// The record exists but the result would be identical (or the new title
    /// and body are both blank). Nothing was written.
    Unchanged,
    /// No record with the given id. Nothing was written.
    NotFound,
}

/// Source of comment ids, injectable for tests.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// The wall clock used outside tests.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

/// A delete that has been requested but not yet confirmed.
///
/// Holds no store state — dropping it abandons the delete and leaves the
/// store untouched. Only [`CommentStore::confirm_remove`], which consumes the
/// value, can actually remove the record.
#[derive(Debug)]
pub struct PendingDelete {
    token: Uuid,
    comment_id: i64,
}

impl PendingDelete {
    /// Opaque token correlating the confirmation reply with this request.
    pub fn token(&self) -> Uuid {
        self.token
    }

    /// The comment this delete targets.
    pub fn comment_id(&self) -> i64 {
        self.comment_id
    }
}

/// Durable store over the three JSON documents in a store directory.
pub struct CommentStore {
    dir: PathBuf,
    clock: Box<dyn Clock>,
    /// Highest id handed out so far; ids are bumped past it when the clock
    /// returns the same millisecond twice.
    last_id: AtomicI64,
    refresh_tx: Option<UnboundedSender<Refresh>>,
    /// Serializes every read-modify-write sequence. Single-process only —
    /// see the module docs.
    write_gate: Mutex<()>,
}

impl CommentStore {
    /// Creates a store rooted at `dir` using the system clock.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, Box::new(SystemClock))
    }

    /// Creates a store with an injected clock (tests).
    pub fn with_clock(dir: impl Into<PathBuf>, clock: Box<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
            last_id: AtomicI64::new(0),
            refresh_tx: None,
            write_gate: Mutex::new(()),
        }
    }

    /// Registers the channel that receives one [`Refresh`] per durable write.
    ///
    /// Called once at startup, before the store is shared with the event
    /// loop. Send errors are ignored — a dropped receiver just means nobody
    /// is listening any more.
    pub fn attach_refresh(&mut self, tx: UnboundedSender<Refresh>) {
        self.refresh_tx = Some(tx);
    }

    /// Creates the store directory and skeleton documents on first use.
    ///
    /// # Errors
    ///
    /// Propagates [`schema::bootstrap`] failures.
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        schema::bootstrap(&self.dir).await
    }

    /// Loads every anchored comment, in store order.
    ///
    /// An absent document is not an error: the skeleton is written and an
    /// empty collection returned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] for a malformed document and
    /// [`StoreError::Io`] for unreadable files.
    pub async fn load_inline(&self) -> Result<Vec<InlineComment>, StoreError> {
        Ok(self.read_inline().await?.inline_comments)
    }

    /// Loads the anchored comments for one file, in store order.
    ///
    /// `file_name` must be the normalized workspace-relative path — the store
    /// never compares absolute paths.
    ///
    /// # Errors
    ///
    /// Same as [`CommentStore::load_inline`].
    pub async fn comments_for_file(&self, file_name: &str) -> Result<Vec<InlineComment>, StoreError> {
        let mut comments = self.load_inline().await?;
        comments.retain(|c| c.file_name == file_name);
        Ok(comments)
    }

    /// Appends a new anchored comment and returns the stored record.
    ///
    /// The id is the creation timestamp in milliseconds, bumped to stay
    /// strictly monotonic when two appends land in the same millisecond.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when both `title` and `comment`
    /// are blank after trimming — nothing is written in that case.
    pub async fn append(
        &self,
        file_name: &str,
        span: Span,
        title: &str,
        comment: &str,
        priority: Option<Priority>,
    ) -> Result<InlineComment, StoreError> {
        if title.trim().is_empty() && comment.trim().is_empty() {
            return Err(StoreError::Validation(
                "Please enter either a title or a comment.",
            ));
        }

        let guard = self.write_gate.lock().await;
        let mut doc = self.read_inline().await?;
        let record = InlineComment {
            id: self.next_id(),
            file_name: file_name.to_owned(),
            start: span.start,
            end: span.end,
            title: title.to_owned(),
            comment: comment.to_owned(),
            priority,
        };
        doc.inline_comments.push(record.clone());
        self.write_document(INLINE_COMMENTS_FILE, &doc).await?;
        drop(guard);

        self.notify_refresh();
        Ok(record)
    }

    /// Updates title, body, and priority of the comment with `id`.
    ///
    /// The anchor never moves. Returns [`Mutation::Unchanged`] — without
    /// writing or firing a refresh — when all three fields already equal the
    /// stored values, or when the new title and body are both blank.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] / [`StoreError::Io`] from the document
    /// read or write.
    pub async fn update(
        &self,
        id: i64,
        title: &str,
        comment: &str,
        priority: Option<Priority>,
    ) -> Result<Mutation, StoreError> {
        let guard = self.write_gate.lock().await;
        let mut doc = self.read_inline().await?;
        let Some(existing) = doc.inline_comments.iter_mut().find(|c| c.id == id) else {
            return Ok(Mutation::NotFound);
        };

        let blank = title.trim().is_empty() && comment.trim().is_empty();
        let unchanged = existing.title == title
            && existing.comment == comment
            && existing.priority == priority;
        if blank || unchanged {
            return Ok(Mutation::Unchanged);
        }

        existing.title = title.to_owned();
        existing.comment = comment.to_owned();
        existing.priority = priority;
        self.write_document(INLINE_COMMENTS_FILE, &doc).await?;
        drop(guard);

        self.notify_refresh();
        Ok(Mutation::Applied)
    }

    /// First phase of a delete: records intent, touches nothing.
    ///
    /// The returned value must be passed to [`CommentStore::confirm_remove`]
    /// to carry the delete out; dropping it cancels. The id is not checked
    /// here — a vanished comment surfaces as [`Mutation::NotFound`] on
    /// confirm.
    pub fn request_remove(&self, comment_id: i64) -> PendingDelete {
        PendingDelete {
            token: Uuid::new_v4(),
            comment_id,
        }
    }

    /// Second phase of a delete: removes exactly the record named by
    /// `pending`, leaving every other record byte-identical.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] / [`StoreError::Io`] from the document
    /// read or write.
    pub async fn confirm_remove(&self, pending: PendingDelete) -> Result<Mutation, StoreError> {
        let guard = self.write_gate.lock().await;
        let mut doc = self.read_inline().await?;
        let Some(index) = doc
            .inline_comments
            .iter()
            .position(|c| c.id == pending.comment_id)
        else {
            return Ok(Mutation::NotFound);
        };

        doc.inline_comments.remove(index);
        self.write_document(INLINE_COMMENTS_FILE, &doc).await?;
        drop(guard);

        self.notify_refresh();
        Ok(Mutation::Applied)
    }

    /// Replaces the general-comments draft wholesale.
    ///
    /// Entries with an empty comment and no score are dropped; the remaining
    /// entries get fresh ids. Returns how many entries were persisted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when every entry is empty
    /// ("Cannot save empty draft.") — the previous draft is kept.
    pub async fn replace_general(&self, draft: &[GeneralDraft]) -> Result<usize, StoreError> {
        let kept: Vec<GeneralComment> = draft
            .iter()
            .filter(|entry| !entry.comment.is_empty() || entry.score.is_some())
            .map(|entry| GeneralComment {
                id: self.next_id(),
                comment: entry.comment.clone(),
                rubric_id: entry.rubric_id,
                score: entry.score,
            })
            .collect();
        if kept.is_empty() {
            return Err(StoreError::Validation("Cannot save empty draft."));
        }

        let guard = self.write_gate.lock().await;
        let count = kept.len();
        let doc = GeneralDocument {
            general_comments: kept,
        };
        self.write_document(GENERAL_COMMENTS_FILE, &doc).await?;
        drop(guard);

        self.notify_refresh();
        Ok(count)
    }

    /// Loads the current general-comments draft.
    ///
    /// # Errors
    ///
    /// Same as [`CommentStore::load_inline`].
    pub async fn load_general(&self) -> Result<Vec<GeneralComment>, StoreError> {
        let path = self.dir.join(GENERAL_COMMENTS_FILE);
        let doc: GeneralDocument = self.read_or_bootstrap(&path).await?;
        Ok(doc.general_comments)
    }

    /// Loads the rubric criteria.
    ///
    /// # Errors
    ///
    /// Same as [`CommentStore::load_inline`].
    pub async fn load_rubrics(&self) -> Result<Vec<Rubric>, StoreError> {
        let path = self.dir.join(RUBRICS_FILE);
        let doc: RubricsDocument = self.read_or_bootstrap(&path).await?;
        Ok(doc.rubrics)
    }

    /// Hands out the next comment id: the current clock reading, bumped past
    /// the previous id when the clock has not advanced.
    fn next_id(&self) -> i64 {
        let now = self.clock.now_millis();
        let prev = self
            .last_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|v| v);
        now.max(prev + 1)
    }

    fn notify_refresh(&self) {
        if let Some(tx) = &self.refresh_tx {
            let _ = tx.send(Refresh);
        }
    }

    async fn read_inline(&self) -> Result<InlineDocument, StoreError> {
        let path = self.dir.join(INLINE_COMMENTS_FILE);
        self.read_or_bootstrap(&path).await
    }

    /// Reads one document; an absent file re-runs bootstrap and yields the
    /// default document instead of an error.
    async fn read_or_bootstrap<T>(&self, path: &Path) -> Result<T, StoreError>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => schema::parse_document(path, &raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.bootstrap().await?;
                Ok(T::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document<T: serde::Serialize>(
        &self,
        file: &str,
        doc: &T,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(doc).map_err(|e| StoreError::Io(e.into()))?;
        tokio::fs::write(self.dir.join(file), raw).await?;
        Ok(())
    }
}
