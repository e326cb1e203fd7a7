use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::access::Access;
use crate::error::NotesError;
use crate::models::*;
use crate::service::NotesService;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a service error to a response.
///
/// Rejections carry their message to the client. Store failures are logged
/// in full server-side and the client only sees a generic message.
fn api_error(e: NotesError) -> (StatusCode, String) {
    let status = match &e {
        NotesError::NotFound(_) => StatusCode::NOT_FOUND,
        NotesError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        NotesError::DuplicateGrant(_) | NotesError::SelfShare => StatusCode::CONFLICT,
        NotesError::Validation(_) => StatusCode::BAD_REQUEST,
        NotesError::Unauthenticated => StatusCode::UNAUTHORIZED,
        NotesError::CascadeIncomplete { .. } | NotesError::Store(_) => {
            tracing::error!("Internal error: {:#}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            );
        }
    };

    tracing::warn!("Request rejected: {}", e);
    (status, e.to_string())
}

// ============================================================
// Health and vocabulary
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_symbols() -> Json<Vec<SymbolInfo>> {
    Json(Symbol::ALL.into_iter().map(SymbolInfo::from).collect())
}

// ============================================================
// Session
// ============================================================

pub async fn login(
    State(service): State<NotesService>,
    Json(input): Json<LoginInput>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    service
        .login(input)
        .map(|s| (StatusCode::CREATED, Json(s)))
        .map_err(api_error)
}

pub async fn me(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}

pub async fn logout(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
) -> ApiResult<StatusCode> {
    service
        .logout(&session)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(api_error)
}

// ============================================================
// Dashboards
// ============================================================

pub async fn dashboard_overview(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<DashboardOverview>> {
    service
        .dashboard_overview(&session)
        .map(Json)
        .map_err(api_error)
}

pub async fn create_dashboard(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Json(input): Json<CreateDashboardInput>,
) -> ApiResult<(StatusCode, Json<Dashboard>)> {
    service
        .create_dashboard(&session, input)
        .map(|d| (StatusCode::CREATED, Json(d)))
        .map_err(api_error)
}

pub async fn get_dashboard(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DashboardView>> {
    service
        .open_dashboard(&session, id)
        .map(Json)
        .map_err(api_error)
}

pub async fn rename_dashboard(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(input): Json<RenameDashboardInput>,
) -> ApiResult<Json<Dashboard>> {
    service
        .rename_dashboard(&session, id, input)
        .map(Json)
        .map_err(api_error)
}

pub async fn delete_dashboard(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CascadeReport>> {
    service
        .delete_dashboard(&session, id)
        .map(Json)
        .map_err(api_error)
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub access: Access,
}

pub async fn get_access(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Json<AccessResponse> {
    Json(AccessResponse {
        access: service.access_to(&session, id),
    })
}

// ============================================================
// Shares
// ============================================================

pub async fn list_shares(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(dashboard_id): Path<Uuid>,
) -> ApiResult<Json<Vec<DashboardShare>>> {
    service
        .list_shares(&session, dashboard_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn grant_share(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(dashboard_id): Path<Uuid>,
    Json(input): Json<GrantShareInput>,
) -> ApiResult<(StatusCode, Json<DashboardShare>)> {
    service
        .grant_share(&session, dashboard_id, input)
        .map(|s| (StatusCode::CREATED, Json(s)))
        .map_err(api_error)
}

pub async fn update_share(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateShareInput>,
) -> ApiResult<Json<DashboardShare>> {
    service
        .update_share_level(&session, id, input.permission_level)
        .map(Json)
        .map_err(api_error)
}

pub async fn revoke_share(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service
        .revoke_share(&session, id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(api_error)
}

// ============================================================
// Notes
// ============================================================

pub async fn list_notes(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(dashboard_id): Path<Uuid>,
    Query(query): Query<NoteListQuery>,
) -> ApiResult<Json<Vec<Note>>> {
    service
        .list_notes(&session, dashboard_id, &query)
        .map(Json)
        .map_err(api_error)
}

pub async fn create_note(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(dashboard_id): Path<Uuid>,
    Json(input): Json<SaveNoteInput>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    service
        .create_note(&session, dashboard_id, input)
        .map(|n| (StatusCode::CREATED, Json(n)))
        .map_err(api_error)
}

pub async fn update_note(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(input): Json<SaveNoteInput>,
) -> ApiResult<Json<Note>> {
    service
        .update_note(&session, id, input)
        .map(Json)
        .map_err(api_error)
}

pub async fn delete_note(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service
        .delete_note(&session, id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(api_error)
}

pub async fn note_history(
    State(service): State<NotesService>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<NoteVersion>>> {
    service
        .note_history(&session, id)
        .map(Json)
        .map_err(api_error)
}
