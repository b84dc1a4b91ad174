//! Note record and aggregate types.
//!
//! # Responsibility
//! - `NoteRecord`: the persisted metadata row (excludes body text).
//! - `NoteContent`: explicit loaded/unloaded state for the body text.
//! - `Note`: record plus content, the shape held by the directory cache.
//!
//! # Invariants
//! - `id` is unique and immutable after creation.
//! - `start_time` is the sort key for all timeline ordering.
//! - Timestamps are epoch seconds (`REAL` in storage).

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a note, persisted as its string form.
pub type NoteId = Uuid;

/// Persisted metadata row for a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Stable note id.
    pub id: NoteId,
    /// Short display string shown in the timeline.
    pub emoji: String,
    /// Note title.
    pub title: String,
    /// Derived plain-text preview, cached at write time.
    pub summary: String,
    /// Path of the content file, derived from `id` on first save.
    pub file_path: String,
    /// Start timestamp in epoch seconds. Primary sort key.
    pub start_time: f64,
    /// End timestamp in epoch seconds.
    pub end_time: f64,
    /// Row creation timestamp, set by the record store.
    pub created_at: f64,
    /// Last mutation timestamp, bumped by the record store.
    pub updated_at: f64,
}

/// Body text state of an in-memory note.
///
/// Loading is an explicit operation on the directory; there is no
/// access-triggered file I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteContent {
    /// Body text not in memory; the record's `file_path` locates it.
    Unloaded,
    /// Body text cached in memory.
    Loaded(String),
}

impl NoteContent {
    /// Returns the cached text, or `None` when unloaded.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Unloaded => None,
            Self::Loaded(text) => Some(text.as_str()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// In-memory note aggregate: one record plus its (possibly unloaded) content.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub record: NoteRecord,
    pub content: NoteContent,
}

/// Input shape for creating a note that has never been persisted.
///
/// The directory assigns the id-derived file path and the summary during
/// `save`, so drafts carry neither.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    pub emoji: String,
    pub title: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl NoteDraft {
    pub fn new(
        emoji: impl Into<String>,
        title: impl Into<String>,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self {
            emoji: emoji.into(),
            title: title.into(),
            start_time,
            end_time,
        }
    }
}

impl Note {
    /// Wraps a record loaded from storage; content stays unloaded.
    pub fn from_record(record: NoteRecord) -> Self {
        Self {
            record,
            content: NoteContent::Unloaded,
        }
    }

    pub fn id(&self) -> NoteId {
        self.record.id
    }

    /// Primary timestamp used for sorting (the start time).
    pub fn timestamp(&self) -> f64 {
        self.record.start_time
    }

    /// UTC calendar day of the start time, as `YYYY-MM-DD`.
    pub fn date_key(&self) -> String {
        date_key_for(self.record.start_time)
    }
}

/// Formats an epoch-second timestamp as a UTC `YYYY-MM-DD` grouping key.
pub fn date_key_for(epoch_seconds: f64) -> String {
    DateTime::from_timestamp(epoch_seconds as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "1970-01-01".to_string())
}

/// Current wall-clock time in epoch seconds.
pub fn now_epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
