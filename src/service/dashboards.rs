use uuid::Uuid;

use crate::access::{Access, Action};
use crate::db::{DashboardQuery, NoteQuery, ShareQuery, Sort};
use crate::error::{NotesError, Result};
use crate::models::{
    CascadeReport, CreateDashboardInput, Dashboard, DashboardOverview, NewDashboard,
    RenameDashboardInput, Session, SharedDashboard, SweepReport,
};

use super::NotesService;

impl NotesService {
    /// Create a dashboard owned by the caller. It starts with no notes and no shares.
    pub fn create_dashboard(&self, session: &Session, input: CreateDashboardInput) -> Result<Dashboard> {
        let name = validate_name(&input.name)?;

        let dashboard = self.db.create_dashboard(NewDashboard {
            name,
            owner_email: session.email().to_string(),
        })?;

        tracing::info!("{} created dashboard {}", session.email(), dashboard.id);
        Ok(dashboard)
    }

    /// Rename a dashboard. Owner only.
    pub fn rename_dashboard(
        &self,
        session: &Session,
        dashboard_id: Uuid,
        input: RenameDashboardInput,
    ) -> Result<Dashboard> {
        self.authorize(session, dashboard_id, Action::RenameDashboard)?;
        let name = validate_name(&input.name)?;

        let dashboard = self
            .db
            .update_dashboard(dashboard_id, &name)?
            .ok_or(NotesError::NotFound("Dashboard"))?;

        tracing::info!("Dashboard {} renamed", dashboard.id);
        Ok(dashboard)
    }

    /// Delete a dashboard and everything it owns. Owner only.
    ///
    /// Runs as an ordered batch: each note together with its versions, then the
    /// shares, then the dashboard record. A note and its versions go in one
    /// store transaction; nothing beyond that is rolled back if a step fails.
    /// The error names the stage reached, the dashboard survives any failure
    /// before the last stage, and [`sweep_orphans`] removes whatever was left
    /// behind by a failure after it.
    ///
    /// [`sweep_orphans`]: Self::sweep_orphans
    pub fn delete_dashboard(&self, session: &Session, dashboard_id: Uuid) -> Result<CascadeReport> {
        let (dashboard, _) = self.authorize(session, dashboard_id, Action::DeleteDashboard)?;
        let mut report = CascadeReport::default();

        let notes = stage(
            "notes",
            self.db.filter_notes(
                &NoteQuery {
                    dashboard_id: Some(dashboard.id),
                    ..Default::default()
                },
                None,
                None,
            ),
        )?;
        for note in notes {
            if let Some(versions) = stage("notes", self.db.delete_note_with_versions(note.id))? {
                report.versions_deleted += versions;
                report.notes_deleted += 1;
            }
        }

        let shares = stage(
            "shares",
            self.db.filter_shares(
                &ShareQuery {
                    dashboard_id: Some(dashboard.id),
                    ..Default::default()
                },
                None,
                None,
            ),
        )?;
        for share in shares {
            if stage("shares", self.db.delete_share(share.id))? {
                report.shares_deleted += 1;
            }
        }

        if !stage("dashboard", self.db.delete_dashboard(dashboard.id))? {
            return Err(NotesError::NotFound("Dashboard"));
        }

        tracing::info!(
            "Dashboard {} deleted with {} notes, {} versions, {} shares",
            dashboard.id,
            report.notes_deleted,
            report.versions_deleted,
            report.shares_deleted
        );
        Ok(report)
    }

    /// Dashboards the caller owns and dashboards shared with them.
    ///
    /// Shares that point at a dashboard which no longer exists are skipped.
    pub fn dashboard_overview(&self, session: &Session) -> Result<DashboardOverview> {
        let owned = self.db.filter_dashboards(
            &DashboardQuery {
                owner_email: Some(session.email().to_string()),
            },
            Some(&Sort::desc("updated_date")),
            None,
        )?;

        let shares = self.db.filter_shares(
            &ShareQuery {
                shared_with_email: Some(session.email().to_string()),
                ..Default::default()
            },
            None,
            None,
        )?;

        let mut shared = Vec::with_capacity(shares.len());
        for share in shares {
            match self.db.get_dashboard(share.dashboard_id)? {
                Some(dashboard) => shared.push(SharedDashboard {
                    dashboard,
                    permission_level: share.permission_level,
                }),
                None => tracing::debug!(
                    "Skipping share {} for missing dashboard {}",
                    share.id,
                    share.dashboard_id
                ),
            }
        }
        shared.sort_by(|a, b| b.dashboard.updated_date.cmp(&a.dashboard.updated_date));

        Ok(DashboardOverview { owned, shared })
    }

    /// Remove records whose parent is gone.
    ///
    /// Recovery path for a cascade delete that stopped part way. Orphaned notes
    /// take their versions with them; versions of notes that are already gone
    /// are found in a second pass.
    pub fn sweep_orphans(&self) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        let orphans = self.db.find_orphans()?;

        for note_id in orphans.notes {
            if let Some(versions) = self.db.delete_note_with_versions(note_id)? {
                report.versions_removed += versions;
                report.notes_removed += 1;
            }
        }

        for share_id in orphans.shares {
            if self.db.delete_share(share_id)? {
                report.shares_removed += 1;
            }
        }

        for version_id in self.db.find_orphans()?.versions {
            if self.db.delete_version(version_id)? {
                report.versions_removed += 1;
            }
        }

        if report.is_empty() {
            tracing::debug!("Orphan sweep found nothing to remove");
        } else {
            tracing::warn!(
                "Orphan sweep removed {} notes, {} versions, {} shares",
                report.notes_removed,
                report.versions_removed,
                report.shares_removed
            );
        }
        Ok(report)
    }

    /// The caller's access to a dashboard.
    ///
    /// A dashboard that is missing or cannot be loaded reads as `Denied`; store
    /// failures are logged rather than returned.
    pub fn access_to(&self, session: &Session, dashboard_id: Uuid) -> Access {
        let resolved = self
            .db
            .get_dashboard(dashboard_id)
            .map_err(NotesError::from)
            .and_then(|dashboard| match dashboard {
                Some(dashboard) => self.resolve(&dashboard, session.email()),
                None => Ok(Access::Denied),
            });

        resolved.unwrap_or_else(|e| {
            tracing::error!("Treating dashboard {} as denied: {}", dashboard_id, e);
            Access::Denied
        })
    }
}

fn stage<T>(stage: &'static str, result: anyhow::Result<T>) -> Result<T> {
    result.map_err(|source| {
        tracing::error!("Cascade delete failed while deleting {}: {}", stage, source);
        NotesError::CascadeIncomplete { stage, source }
    })
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(NotesError::Validation("Dashboard name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}
