use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::symbol::Symbol;

/// An immutable snapshot of a note at save time.
///
/// One version is appended for every successful create or update of a note.
/// Versions are never edited; they are only deleted together with their note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteVersion {
    pub id: Uuid,
    pub note_id: Uuid,
    pub content: String,
    pub symbol: Symbol,
    pub created_date: DateTime<Utc>,
}

/// Store-level record for a new version.
#[derive(Debug, Clone)]
pub struct NewNoteVersion {
    pub note_id: Uuid,
    pub content: String,
    pub symbol: Symbol,
}
