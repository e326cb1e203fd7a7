use uuid::Uuid;

use crate::error::{NotesError, Result};
use crate::models::{normalize_email, LoginInput, Session, User};

use super::NotesService;

impl NotesService {
    /// Start a session for an identity vouched for by the identity provider.
    pub fn login(&self, input: LoginInput) -> Result<Session> {
        let email = normalize_email(&input.email);
        validate_email(&email)?;

        let full_name = input
            .full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        let session = self.db.create_session(&User { email, full_name })?;
        tracing::info!("Session started for {}", session.email());
        Ok(session)
    }

    /// Look up the live session for a token.
    pub fn me(&self, token: Uuid) -> Result<Session> {
        self.db
            .get_session(token)?
            .ok_or(NotesError::Unauthenticated)
    }

    /// Invalidate a session. The token is unusable afterwards.
    pub fn logout(&self, session: &Session) -> Result<()> {
        if !self.db.delete_session(session.token)? {
            return Err(NotesError::Unauthenticated);
        }
        tracing::info!("Session ended for {}", session.email());
        Ok(())
    }
}

pub(super) fn validate_email(email: &str) -> Result<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(NotesError::Validation(format!(
            "'{email}' is not a valid email address"
        ))),
    }
}
