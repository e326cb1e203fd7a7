//! Access levels and the permission matrix.
//!
//! Every gate in the service layer goes through [`Access::allows`], so the
//! three-tier model (owner, editor, viewer) lives in exactly one table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NotesError;
use crate::models::ShareLevel;

/// The caller's resolved access to a dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Owner,
    Editor,
    Viewer,
    Denied,
}

/// Something a caller may try to do on a dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ViewDashboard,
    ViewHistory,
    CreateNote,
    EditNote,
    DeleteNote,
    RenameDashboard,
    DeleteDashboard,
    ManageShares,
}

impl Access {
    pub fn allows(&self, action: Action) -> bool {
        use Action::*;

        match (self, action) {
            (Access::Denied, _) => false,
            (Access::Owner, _) => true,
            (Access::Editor, ViewDashboard | ViewHistory | CreateNote | EditNote | DeleteNote) => {
                true
            }
            (Access::Editor, RenameDashboard | DeleteDashboard | ManageShares) => false,
            (Access::Viewer, ViewDashboard | ViewHistory) => true,
            (Access::Viewer, _) => false,
        }
    }

    pub fn require(&self, action: Action) -> Result<(), NotesError> {
        if self.allows(action) {
            Ok(())
        } else {
            Err(NotesError::PermissionDenied(action))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
            Self::Denied => "denied",
        }
    }
}

impl From<ShareLevel> for Access {
    fn from(level: ShareLevel) -> Self {
        match level {
            ShareLevel::Viewer => Access::Viewer,
            ShareLevel::Editor => Access::Editor,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewDashboard => "view dashboard",
            Self::ViewHistory => "view note history",
            Self::CreateNote => "create note",
            Self::EditNote => "edit note",
            Self::DeleteNote => "delete note",
            Self::RenameDashboard => "rename dashboard",
            Self::DeleteDashboard => "delete dashboard",
            Self::ManageShares => "manage shares",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
