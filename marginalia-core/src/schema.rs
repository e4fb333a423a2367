//! Persisted document shapes and first-use bootstrap.
//!
//! The store is three flat JSON documents inside the store directory, one per
//! collection. Bootstrap is applied unconditionally before the first read —
//! it creates whatever is missing and never touches an existing file, so it
//! is safe to run on every startup.

use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;
use crate::types::{GeneralComment, InlineComment, Rubric};

/// File holding the anchored comments, relative to the store directory.
pub const INLINE_COMMENTS_FILE: &str = "inline-comments.json";
/// File holding the current general-comments draft.
pub const GENERAL_COMMENTS_FILE: &str = "general-comments.json";
/// File holding the rubric criteria. Read-only from the store's perspective.
pub const RUBRICS_FILE: &str = "rubrics.json";

/// `{"inlineComments": [...]}` — the anchored-comment collection.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineDocument {
    pub inline_comments: Vec<InlineComment>,
}

/// `{"generalComments": [...]}` — the general-comments draft.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralDocument {
    pub general_comments: Vec<GeneralComment>,
}

/// `{"rubrics": [...]}` — the review criteria.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RubricsDocument {
    pub rubrics: Vec<Rubric>,
}

/// Creates the store directory and empty skeleton documents for every
/// collection that does not exist yet.
///
/// The workspace root (the store directory's parent) must already exist —
/// bootstrap refuses to invent a workspace.
///
/// # Errors
///
/// Returns [`StoreError::WorkspaceMissing`] when the parent directory is
/// absent, or [`StoreError::Io`] when directory or file creation fails.
pub async fn bootstrap(dir: &Path) -> Result<(), StoreError> {
    if let Some(root) = dir.parent() {
        if !tokio::fs::try_exists(root).await.unwrap_or(false) {
            return Err(StoreError::WorkspaceMissing {
                path: root.to_owned(),
            });
        }
    }
    tokio::fs::create_dir_all(dir).await?;

    create_if_absent(&dir.join(INLINE_COMMENTS_FILE), &skeleton(&InlineDocument::default())).await?;
    create_if_absent(&dir.join(GENERAL_COMMENTS_FILE), &skeleton(&GeneralDocument::default())).await?;
    create_if_absent(&dir.join(RUBRICS_FILE), &skeleton(&RubricsDocument::default())).await?;
    Ok(())
}

/// Parses one persisted document, attributing failures to its path.
///
/// # Errors
///
/// Returns [`StoreError::Parse`] when `raw` is not valid JSON for `T`.
pub(crate) fn parse_document<T: DeserializeOwned>(path: &Path, raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|source| StoreError::Parse {
        path: path.to_owned(),
        source,
    })
}

fn skeleton<T: Serialize>(doc: &T) -> String {
    // Serializing the Default document keeps the skeleton byte-identical to
    // what a write of an empty collection would produce.
    serde_json::to_string(doc).unwrap_or_default()
}

/// Writes `skeleton` to `path` only if the file does not exist.
///
/// Uses `create_new` so an existing document is never truncated, even if two
/// bootstrap calls race.
async fn create_if_absent(path: &Path, skeleton: &str) -> Result<(), StoreError> {
    match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(mut file) => {
            file.write_all(skeleton.as_bytes()).await?;
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e.into()),
    }
}
