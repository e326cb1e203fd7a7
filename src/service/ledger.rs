use uuid::Uuid;

use crate::access::Action;
use crate::db::{Sort, VersionQuery};
use crate::error::Result;
use crate::models::{NoteVersion, Session};

use super::NotesService;

// Versions are appended by the store in the same transaction as the note
// write (`create_note_with_version`, `update_note_with_version`) and removed
// with it (`delete_note_with_versions`). Nothing else writes to the ledger.

impl NotesService {
    /// A note's history, newest first. Any access to the dashboard suffices.
    pub fn note_history(&self, session: &Session, note_id: Uuid) -> Result<Vec<NoteVersion>> {
        let (note, _) = self.authorize_note(session, note_id, Action::ViewHistory)?;
        self.versions_of(note.id)
    }

    fn versions_of(&self, note_id: Uuid) -> Result<Vec<NoteVersion>> {
        let versions = self.db.filter_versions(
            &VersionQuery {
                note_id: Some(note_id),
            },
            Some(&Sort::desc("created_date")),
            None,
        )?;
        Ok(versions)
    }
}
