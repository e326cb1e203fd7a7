use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::symbol::Symbol;

/// A research note on a dashboard.
///
/// Anyone with editor or owner access to the dashboard may change it. Every
/// successful save appends a [`NoteVersion`](super::NoteVersion).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub dashboard_id: Uuid,
    pub content: String,
    pub symbol: Symbol,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

/// Input for creating or editing a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveNoteInput {
    /// Note text. Surrounding whitespace is trimmed and the result must not be empty.
    pub content: String,
    #[serde(default)]
    pub symbol: Symbol,
}

/// Store-level record for a new note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub dashboard_id: Uuid,
    pub content: String,
    pub symbol: Symbol,
}

/// Store-level changes applied to an existing note.
#[derive(Debug, Clone)]
pub struct NoteChanges {
    pub content: String,
    pub symbol: Symbol,
}

/// Field notes on a dashboard can be ordered by.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteSortField {
    #[default]
    UpdatedDate,
    CreatedDate,
}

impl NoteSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpdatedDate => "updated_date",
            Self::CreatedDate => "created_date",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query parameters for listing the notes on a dashboard.
///
/// Ordering happens in the store; `search` and `symbol` are applied to the
/// fetched list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteListQuery {
    #[serde(default)]
    pub sort_by: NoteSortField,
    #[serde(default)]
    pub order: SortOrder,
    /// Case-insensitive substring match against the note content.
    pub search: Option<String>,
    pub symbol: Option<Symbol>,
}

impl NoteListQuery {
    /// Sort specifier in store syntax, e.g. `-updated_date`.
    pub fn sort_spec(&self) -> String {
        match self.order {
            SortOrder::Asc => self.sort_by.as_str().to_string(),
            SortOrder::Desc => format!("-{}", self.sort_by.as_str()),
        }
    }

    pub fn matches(&self, note: &Note) -> bool {
        if let Some(symbol) = self.symbol {
            if note.symbol != symbol {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => note
                .content
                .to_lowercase()
                .contains(&term.to_lowercase()),
            _ => true,
        }
    }
}
