mod handlers;
mod middleware;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::service::NotesService;

pub fn create_router(service: NotesService) -> Router {
    create_router_with_config(service, &ServerConfig::default())
}

pub fn create_router_with_config(service: NotesService, config: &ServerConfig) -> Router {
    let public = Router::new()
        .route("/auth/login", post(handlers::login))
        .route("/symbols", get(handlers::list_symbols))
        .route("/health", get(handlers::health));

    let authenticated = Router::new()
        // Session
        .route("/auth/me", get(handlers::me))
        .route("/auth/logout", post(handlers::logout))
        // Dashboards
        .route(
            "/dashboards",
            get(handlers::dashboard_overview).post(handlers::create_dashboard),
        )
        .route(
            "/dashboards/{id}",
            get(handlers::get_dashboard)
                .put(handlers::rename_dashboard)
                .delete(handlers::delete_dashboard),
        )
        .route("/dashboards/{id}/access", get(handlers::get_access))
        // Shares
        .route(
            "/dashboards/{id}/shares",
            get(handlers::list_shares).post(handlers::grant_share),
        )
        .route(
            "/shares/{id}",
            put(handlers::update_share).delete(handlers::revoke_share),
        )
        // Notes
        .route(
            "/dashboards/{id}/notes",
            get(handlers::list_notes).post(handlers::create_note),
        )
        .route(
            "/notes/{id}",
            put(handlers::update_note).delete(handlers::delete_note),
        )
        .route("/notes/{id}/history", get(handlers::note_history))
        .route_layer(axum::middleware::from_fn_with_state(
            service.clone(),
            middleware::session_middleware,
        ));

    Router::new()
        .nest("/api/v1", public.merge(authenticated))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config)),
        )
        .with_state(service)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}
