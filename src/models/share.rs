use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A grant of access on a dashboard to a single email address.
///
/// At most one share exists per (`dashboard_id`, `shared_with_email`). Changing
/// the level updates the record in place; revoking deletes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardShare {
    pub id: Uuid,
    pub dashboard_id: Uuid,
    pub shared_with_email: String,
    pub permission_level: ShareLevel,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

/// The level a share grants. Ownership is not a share level.
///
/// - `Viewer`: can open the dashboard and read notes and their history
/// - `Editor`: can additionally create, edit and delete notes
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ShareLevel {
    #[default]
    Viewer,
    Editor,
}

impl ShareLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "viewer" => Some(Self::Viewer),
            "editor" => Some(Self::Editor),
            _ => None,
        }
    }
}

/// Input for sharing a dashboard with someone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantShareInput {
    pub email: String,
    #[serde(default)]
    pub permission_level: ShareLevel,
}

/// Input for changing the level of an existing share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateShareInput {
    pub permission_level: ShareLevel,
}

/// Store-level record for a new share.
#[derive(Debug, Clone)]
pub struct NewShare {
    pub dashboard_id: Uuid,
    pub shared_with_email: String,
    pub permission_level: ShareLevel,
}
