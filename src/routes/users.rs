//! Public profile routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Serialize;
use sqlx::Row;

use super::auth::AuthUser;
use crate::services::{account, project};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProfileWithStats {
    #[serde(flatten)]
    pub profile: account::PublicProfile,
    pub stats: ProfileStats,
}

#[derive(Serialize)]
pub struct ProfileStats {
    pub project_count: i64,
    pub total_views: i64,
}

/// `GET /api/users/{username}` — public profile with aggregate stats.
pub async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let profile = match account::profile_by_username(&state.pool, &username).await {
        Ok(profile) => profile,
        Err(account::AccountError::NotFound) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!(error = %e, "profile lookup failed");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let stats_row = sqlx::query(
        r"SELECT COUNT(*) AS project_count,
                 COALESCE(SUM(views), 0)::BIGINT AS total_views
          FROM projects WHERE user_id = $1",
    )
    .bind(profile.id)
    .fetch_one(&state.pool)
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let stats = ProfileStats {
        project_count: stats_row.get("project_count"),
        total_views: stats_row.get("total_views"),
    };

    Ok(Json(ProfileWithStats { profile, stats }))
}

/// `GET /api/users/{username}/projects` — one user's showcase.
pub async fn user_projects(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let profile = account::profile_by_username(&state.pool, &username)
        .await
        .map_err(|e| match e {
            account::AccountError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        })?;

    let items = project::list_by_user(&state.pool, profile.id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(items))
}

/// `PUT /api/users/me` — owner-only profile edit. Username is immutable
/// here; only the claim flow sets it.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<account::ProfileUpdate>,
) -> Result<impl IntoResponse, StatusCode> {
    let profile = account::update_profile(&state.pool, auth.user.id, &update)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "profile update failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(profile))
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
