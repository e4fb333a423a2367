//! Stored comment and rubric types.
//!
//! Two coordinate conventions meet in this module. The store keeps 1-based
//! line/character positions — the numbers a reviewer sees in the editor
//! gutter — while every document query (line counts, selections, decoration
//! ranges) is 0-based. [`Position`] is always the stored form; the
//! `from_document`/`document_*` pair is the single conversion point.

use serde::{Deserialize, Serialize};

/// A stored (1-based) line/character position.
///
/// Ordering is lexicographic on `(line, character)`, which is what span
/// containment is defined against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    /// Converts a 0-based document coordinate pair into the stored form.
    pub fn from_document(line: u32, character: u32) -> Self {
        Self {
            line: line + 1,
            character: character + 1,
        }
    }

    /// The 0-based document line for this position.
    pub fn document_line(self) -> u32 {
        self.line - 1
    }

    /// The 0-based document character for this position.
    pub fn document_character(self) -> u32 {
        self.character - 1
    }
}

/// An ordered pair of stored positions delimiting a range of text.
///
/// `start <= end` always holds — [`Span::new`] normalizes reversed input, so
/// a selection made bottom-up anchors the same span as one made top-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Builds a span from two endpoints in either order.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Inclusive containment of a stored point: `start <= point <= end`.
    pub fn contains(self, point: Position) -> bool {
        self.start <= point && point <= self.end
    }

    /// Whether `inner` lies entirely within this span (inclusive).
    pub fn contains_span(self, inner: Span) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }
}

/// Review priority, persisted as its integer value (1 = low, 3 = high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(format!("priority must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value as u8
    }
}

/// A comment anchored to a span of a file.
///
/// The anchor (`file_name`, `start`, `end`) is fixed at creation and never
/// moves as the file is edited afterwards; editing the title or body keeps
/// the original span. `file_name` is a forward-slash path relative to the
/// workspace root so the store stays portable across checkouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineComment {
    /// Milliseconds-since-epoch at creation; unique across the store and the
    /// sole key for update/delete.
    pub id: i64,
    pub file_name: String,
    pub start: Position,
    pub end: Position,
    /// Short label. May be empty only when `comment` is not.
    pub title: String,
    /// Free-text body. May be empty only when `title` is not.
    pub comment: String,
    /// Absent means "unset" and is omitted from the persisted JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl InlineComment {
    /// The stored anchor span.
    pub fn span(&self) -> Span {
        Span {
            start: self.start,
            end: self.end,
        }
    }
}

/// A non-anchored comment recorded against one rubric criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralComment {
    pub id: i64,
    pub comment: String,
    pub rubric_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// One entry of a general-comments draft as submitted by the review UI.
///
/// Drafts carry no id — the store assigns ids when the draft is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralDraft {
    pub comment: String,
    pub rubric_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A named review criterion.
///
/// `has_score` is persisted as the strings `"true"` / `"false"` — the shape
/// the rubric documents have always used — so it round-trips untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub has_score: String,
}

impl Rubric {
    /// Whether this criterion takes a numeric score.
    pub fn wants_score(&self) -> bool {
        self.has_score == "true"
    }
}
