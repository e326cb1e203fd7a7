use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An identity issued by the identity provider. Read-only to this system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Normalised email; the key every ownership and share check correlates on.
    pub email: String,
    pub full_name: String,
}

/// Session context passed explicitly into every service call.
///
/// Acquired at login and invalid from the moment of logout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: Uuid,
    pub user: User,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn email(&self) -> &str {
        &self.user.email
    }
}

/// Input for logging in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Normalise an email for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
