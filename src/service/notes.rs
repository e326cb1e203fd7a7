use uuid::Uuid;

use crate::access::Action;
use crate::db::{NoteQuery, Sort};
use crate::error::{NotesError, Result};
use crate::models::{NewNote, Note, NoteChanges, NoteListQuery, SaveNoteInput, Session};

use super::NotesService;

impl NotesService {
    /// Create a note on a dashboard and record its first version.
    pub fn create_note(
        &self,
        session: &Session,
        dashboard_id: Uuid,
        input: SaveNoteInput,
    ) -> Result<Note> {
        let (dashboard, _) = self.authorize(session, dashboard_id, Action::CreateNote)?;
        let content = validate_content(&input.content)?;

        let (note, version) = self.db.create_note_with_version(NewNote {
            dashboard_id: dashboard.id,
            content,
            symbol: input.symbol,
        })?;

        tracing::info!(
            "{} created note {} on dashboard {} (version {})",
            session.email(),
            note.id,
            dashboard.id,
            version.id
        );
        Ok(note)
    }

    /// Overwrite a note's content and symbol and record the new version.
    ///
    /// The write and its version land together or not at all, so an update
    /// racing a delete either leaves nothing behind or is removed with the
    /// note. Last write wins; there is no conflict detection between editors.
    pub fn update_note(&self, session: &Session, note_id: Uuid, input: SaveNoteInput) -> Result<Note> {
        self.authorize_note(session, note_id, Action::EditNote)?;
        let content = validate_content(&input.content)?;

        let (note, version) = self
            .db
            .update_note_with_version(
                note_id,
                NoteChanges {
                    content,
                    symbol: input.symbol,
                },
            )?
            .ok_or(NotesError::NotFound("Note"))?;

        tracing::info!(
            "{} updated note {} (version {})",
            session.email(),
            note.id,
            version.id
        );
        Ok(note)
    }

    /// Delete a note together with its versions.
    pub fn delete_note(&self, session: &Session, note_id: Uuid) -> Result<()> {
        let (note, _) = self.authorize_note(session, note_id, Action::DeleteNote)?;

        let versions = self
            .db
            .delete_note_with_versions(note.id)?
            .ok_or(NotesError::NotFound("Note"))?;

        tracing::info!(
            "{} deleted note {} and {} versions",
            session.email(),
            note.id,
            versions
        );
        Ok(())
    }

    /// Notes on a dashboard, ordered by the store and then filtered by
    /// search term and symbol.
    pub fn list_notes(
        &self,
        session: &Session,
        dashboard_id: Uuid,
        query: &NoteListQuery,
    ) -> Result<Vec<Note>> {
        let (dashboard, _) = self.authorize(session, dashboard_id, Action::ViewDashboard)?;

        let sort = Sort::parse(&query.sort_spec());
        let notes = self.db.filter_notes(
            &NoteQuery {
                dashboard_id: Some(dashboard.id),
                ..Default::default()
            },
            sort.as_ref(),
            None,
        )?;

        Ok(notes.into_iter().filter(|n| query.matches(n)).collect())
    }
}

fn validate_content(content: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(NotesError::Validation("Note content cannot be empty".to_string()));
    }
    Ok(content.to_string())
}
