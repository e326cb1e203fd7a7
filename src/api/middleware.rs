//! Session authentication.
//!
//! Resolves `Authorization: Bearer <token>` to a live [`Session`] and hands it
//! to handlers as a request extension, so every service call receives the
//! session explicitly.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::NotesError;
use crate::models::Session;
use crate::service::NotesService;

pub async fn session_middleware(
    State(service): State<NotesService>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = match bearer_token(&request) {
        Some(token) => token,
        None => {
            tracing::warn!("Missing or malformed Authorization header");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    let session: Session = match service.me(token) {
        Ok(session) => session,
        Err(NotesError::Unauthenticated) => {
            tracing::warn!("Unknown or expired session token");
            return Err(StatusCode::UNAUTHORIZED);
        }
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request<Body>) -> Option<Uuid> {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())?;
    let token = header.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn extracts_uuid_bearer_token() {
        let token = Uuid::new_v4();
        let request = request_with(Some(&format!("Bearer {token}")));
        assert_eq!(bearer_token(&request), Some(token));
    }

    #[test]
    fn rejects_missing_header() {
        assert_eq!(bearer_token(&request_with(None)), None);
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        let request = request_with(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&request), None);
    }

    #[test]
    fn rejects_tokens_that_are_not_uuids() {
        let request = request_with(Some("Bearer not-a-token"));
        assert_eq!(bearer_token(&request), None);
    }
}
