//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! All API endpoints live under `/api`; the SPA is served separately and
//! talks to this router with a bearer token in the `Authorization` header.

pub mod auth;
pub mod projects;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/select-username", post(auth::select_username))
        .route("/api/auth/username-available", get(auth::username_available))
        .route("/api/users/me", put(users::update_me))
        .route("/api/users/{username}", get(users::profile))
        .route("/api/users/{username}/projects", get(users::user_projects))
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/{id}",
            get(projects::fetch).put(projects::update).delete(projects::delete),
        )
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Error body shape shared by every endpoint: `{"detail": "..."}`.
pub(crate) fn error_json(status: StatusCode, detail: impl Into<String>) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "detail": detail.into() })))
}
