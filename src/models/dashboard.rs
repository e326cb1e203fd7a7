use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Access;

use super::share::ShareLevel;

/// A named collection of notes.
///
/// `owner_email` is fixed at creation and identifies the sole owner, who holds
/// every permission implicitly. `updated_date` is refreshed whenever the
/// dashboard record itself is mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dashboard {
    pub id: Uuid,
    pub name: String,
    pub owner_email: String,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

/// Input for creating a dashboard. The owner is taken from the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDashboardInput {
    pub name: String,
}

/// Input for renaming a dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameDashboardInput {
    pub name: String,
}

/// Store-level record for a new dashboard.
#[derive(Debug, Clone)]
pub struct NewDashboard {
    pub name: String,
    pub owner_email: String,
}

/// A dashboard together with the caller's resolved access level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    #[serde(flatten)]
    pub dashboard: Dashboard,
    pub access: Access,
}

/// A dashboard someone else owns that has been shared with the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedDashboard {
    #[serde(flatten)]
    pub dashboard: Dashboard,
    pub permission_level: ShareLevel,
}

/// Everything the caller can open, split by how they got access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardOverview {
    /// Dashboards the caller owns, most recently updated first.
    pub owned: Vec<Dashboard>,
    /// Dashboards shared with the caller, most recently updated first.
    pub shared: Vec<SharedDashboard>,
}

/// Outcome of deleting a dashboard and everything beneath it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CascadeReport {
    pub versions_deleted: usize,
    pub notes_deleted: usize,
    pub shares_deleted: usize,
}

/// Records left behind by an interrupted cascade and removed by a sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepReport {
    pub versions_removed: usize,
    pub notes_removed: usize,
    pub shares_removed: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.versions_removed == 0 && self.notes_removed == 0 && self.shares_removed == 0
    }
}
