use uuid::Uuid;

use crate::access::{Access, Action};
use crate::db::ShareQuery;
use crate::error::{NotesError, Result};
use crate::models::{normalize_email, Dashboard, DashboardView, Note, Session};

use super::NotesService;

impl NotesService {
    /// Resolve what `email` may do on `dashboard`.
    ///
    /// The owner is recognised by email alone. Anyone else needs a share
    /// record for this exact dashboard; without one the answer is `Denied`.
    pub fn resolve(&self, dashboard: &Dashboard, email: &str) -> Result<Access> {
        let email = normalize_email(email);
        if dashboard.owner_email == email {
            return Ok(Access::Owner);
        }

        let shares = self.db.filter_shares(
            &ShareQuery {
                dashboard_id: Some(dashboard.id),
                shared_with_email: Some(email),
                ..Default::default()
            },
            None,
            Some(1),
        )?;

        Ok(shares
            .first()
            .map(|share| Access::from(share.permission_level))
            .unwrap_or(Access::Denied))
    }

    /// Load a dashboard and check the caller may perform `action` on it.
    pub(super) fn authorize(
        &self,
        session: &Session,
        dashboard_id: Uuid,
        action: Action,
    ) -> Result<(Dashboard, Access)> {
        let dashboard = self
            .db
            .get_dashboard(dashboard_id)?
            .ok_or(NotesError::NotFound("Dashboard"))?;

        let access = self.resolve(&dashboard, session.email())?;
        if let Err(e) = access.require(action) {
            tracing::warn!(
                "{} ({}) tried to {} on dashboard {}",
                session.email(),
                access,
                action,
                dashboard.id
            );
            return Err(e);
        }

        Ok((dashboard, access))
    }

    /// Load a note and check the caller may perform `action` on its dashboard.
    pub(super) fn authorize_note(
        &self,
        session: &Session,
        note_id: Uuid,
        action: Action,
    ) -> Result<(Note, Access)> {
        let note = self
            .db
            .get_note(note_id)?
            .ok_or(NotesError::NotFound("Note"))?;
        let (_, access) = self.authorize(session, note.dashboard_id, action)?;
        Ok((note, access))
    }

    /// Open a dashboard for viewing.
    ///
    /// Fails as a whole when the dashboard is missing or the caller has no
    /// access; nothing is returned in that case.
    pub fn open_dashboard(&self, session: &Session, dashboard_id: Uuid) -> Result<DashboardView> {
        let (dashboard, access) = self.authorize(session, dashboard_id, Action::ViewDashboard)?;
        Ok(DashboardView { dashboard, access })
    }
}
