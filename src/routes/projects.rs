//! Project (hover item) routes. Reads are public, writes require a session.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use uuid::Uuid;

use super::auth::AuthUser;
use super::error_json;
use crate::services::project::{self, HoverItemDraft, ProjectError};
use crate::state::AppState;

fn project_error(err: &ProjectError) -> Response {
    match err {
        ProjectError::NotFound => error_json(StatusCode::NOT_FOUND, "project not found").into_response(),
        ProjectError::Forbidden => {
            error_json(StatusCode::FORBIDDEN, "not authorized to modify this project").into_response()
        }
        ProjectError::Db(e) => {
            tracing::error!(error = %e, "project query failed");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

/// `GET /api/projects` — the public showcase.
pub async fn list(State(state): State<AppState>) -> Response {
    match project::list_all(&state.pool).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => project_error(&e),
    }
}

/// `GET /api/projects/{id}` — single project; increments the view counter.
pub async fn fetch(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match project::fetch_counting_view(&state.pool, id).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => project_error(&e),
    }
}

/// `POST /api/projects` — create a project owned by the caller.
pub async fn create(State(state): State<AppState>, auth: AuthUser, Json(draft): Json<HoverItemDraft>) -> Response {
    match project::create(&state.pool, auth.user.id, &draft).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => project_error(&e),
    }
}

/// `PUT /api/projects/{id}` — owner-only update.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(draft): Json<HoverItemDraft>,
) -> Response {
    match project::update(&state.pool, id, auth.user.id, &draft).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => project_error(&e),
    }
}

/// `DELETE /api/projects/{id}` — owner-only delete.
pub async fn delete(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> Response {
    match project::delete(&state.pool, id, auth.user.id).await {
        Ok(()) => Json(serde_json::json!({ "deleted": true })).into_response(),
        Err(e) => project_error(&e),
    }
}

#[cfg(test)]
#[path = "projects_test.rs"]
mod tests;
