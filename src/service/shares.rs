use uuid::Uuid;

use crate::access::Action;
use crate::db::{self, ShareQuery, Sort};
use crate::error::{NotesError, Result};
use crate::models::{
    normalize_email, DashboardShare, GrantShareInput, NewShare, Session, ShareLevel,
};

use super::identity::validate_email;
use super::NotesService;

impl NotesService {
    /// Share a dashboard with an email address. Owner only.
    ///
    /// Rejected before any write when the email is the caller's own or when a
    /// share for it already exists; an existing share must be changed with
    /// [`update_share_level`](Self::update_share_level) instead.
    pub fn grant_share(
        &self,
        session: &Session,
        dashboard_id: Uuid,
        input: GrantShareInput,
    ) -> Result<DashboardShare> {
        let (dashboard, _) = self.authorize(session, dashboard_id, Action::ManageShares)?;

        let email = normalize_email(&input.email);
        validate_email(&email)?;
        if email == session.email() {
            return Err(NotesError::SelfShare);
        }

        let existing = self.db.filter_shares(
            &ShareQuery {
                dashboard_id: Some(dashboard.id),
                shared_with_email: Some(email.clone()),
                ..Default::default()
            },
            None,
            Some(1),
        )?;
        if !existing.is_empty() {
            return Err(NotesError::DuplicateGrant(email));
        }

        let share = self
            .db
            .create_share(NewShare {
                dashboard_id: dashboard.id,
                shared_with_email: email.clone(),
                permission_level: input.permission_level,
            })
            .map_err(|e| {
                // Lost a race with a concurrent grant for the same email.
                if db::is_constraint_violation(&e) {
                    NotesError::DuplicateGrant(email.clone())
                } else {
                    NotesError::Store(e)
                }
            })?;

        tracing::info!(
            "Dashboard {} shared with {} as {}",
            dashboard.id,
            share.shared_with_email,
            share.permission_level.as_str()
        );
        Ok(share)
    }

    /// Change the level of an existing share. Owner only.
    pub fn update_share_level(
        &self,
        session: &Session,
        share_id: Uuid,
        level: ShareLevel,
    ) -> Result<DashboardShare> {
        let share = self
            .db
            .get_share(share_id)?
            .ok_or(NotesError::NotFound("Share"))?;
        self.authorize(session, share.dashboard_id, Action::ManageShares)?;

        let updated = self
            .db
            .update_share(share_id, level)?
            .ok_or(NotesError::NotFound("Share"))?;

        tracing::info!(
            "Share {} on dashboard {} changed to {}",
            updated.id,
            updated.dashboard_id,
            level.as_str()
        );
        Ok(updated)
    }

    /// Revoke a share. Owner only.
    pub fn revoke_share(&self, session: &Session, share_id: Uuid) -> Result<()> {
        let share = self
            .db
            .get_share(share_id)?
            .ok_or(NotesError::NotFound("Share"))?;
        self.authorize(session, share.dashboard_id, Action::ManageShares)?;

        if !self.db.delete_share(share_id)? {
            return Err(NotesError::NotFound("Share"));
        }

        tracing::info!(
            "Share for {} on dashboard {} revoked",
            share.shared_with_email,
            share.dashboard_id
        );
        Ok(())
    }

    /// All shares on a dashboard, read fresh from the store. Owner only.
    pub fn list_shares(&self, session: &Session, dashboard_id: Uuid) -> Result<Vec<DashboardShare>> {
        let (dashboard, _) = self.authorize(session, dashboard_id, Action::ManageShares)?;

        let shares = self.db.filter_shares(
            &ShareQuery {
                dashboard_id: Some(dashboard.id),
                ..Default::default()
            },
            Some(&Sort::asc("created_date")),
            None,
        )?;
        Ok(shares)
    }
}
