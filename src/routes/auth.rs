//! Auth routes — register, login, bearer sessions, username claim.

use axum::extract::{FromRef, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use super::error_json;
use crate::services::{account, session};
use crate::state::AppState;

/// Pull the bearer token out of the `Authorization` header, if any.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the bearer token.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: account::PublicProfile,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers).map(str::to_owned) else {
            return Err(StatusCode::UNAUTHORIZED);
        };

        let app_state = AppState::from_ref(state);
        let user_id = session::validate_session(&app_state.pool, &token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let user = account::profile_by_id(&app_state.pool, user_id)
            .await
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token })
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

#[derive(Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SelectUsernameBody {
    pub username: String,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub username: String,
}

/// Login/register response: the client persists `access_token` and attaches
/// it to every subsequent request.
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: account::PublicProfile,
    pub needs_username: bool,
}

fn status_for(err: &account::AccountError) -> StatusCode {
    use account::AccountError as E;
    match err {
        E::InvalidEmail | E::WeakPassword | E::EmailTaken | E::InvalidUsername(_) => StatusCode::BAD_REQUEST,
        E::InvalidCredentials | E::AccountDisabled => StatusCode::UNAUTHORIZED,
        E::UsernameTaken | E::UsernameAlreadySet => StatusCode::CONFLICT,
        E::NotFound => StatusCode::NOT_FOUND,
        E::Hash(_) | E::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn account_error(err: &account::AccountError) -> Response {
    let status = status_for(err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "account operation failed");
        return error_json(status, "internal error").into_response();
    }
    error_json(status, err.to_string()).into_response()
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/register` — create an account, mint a session.
pub async fn register(State(state): State<AppState>, Json(body): Json<RegisterBody>) -> Response {
    let user = match account::register(&state.pool, &body.email, &body.password, &body.full_name).await {
        Ok(user) => user,
        Err(e) => return account_error(&e),
    };

    issue_session(&state, user).await
}

/// `POST /api/auth/login` — verify credentials, mint a session.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginBody>) -> Response {
    let user = match account::login(&state.pool, &body.email, &body.password).await {
        Ok(user) => user,
        Err(e) => return account_error(&e),
    };

    issue_session(&state, user).await
}

async fn issue_session(state: &AppState, user: account::PublicProfile) -> Response {
    match session::create_session(&state.pool, user.id, state.config.session_ttl_hours).await {
        Ok(token) => {
            let needs_username = user.needs_username();
            Json(AuthResponse { access_token: token, token_type: "bearer", user, needs_username }).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "failed to create session").into_response()
        }
    }
}

/// `GET /api/auth/me` — return current user.
pub async fn me(auth: AuthUser) -> Json<account::PublicProfile> {
    Json(auth.user)
}

/// `POST /api/auth/logout` — delete the session. Always 204: the client
/// clears local state regardless.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> StatusCode {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(error = %e, "session delete failed");
    }
    StatusCode::NO_CONTENT
}

/// `POST /api/auth/select-username` — one-time username claim.
pub async fn select_username(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SelectUsernameBody>,
) -> Response {
    match account::select_username(&state.pool, auth.user.id, &body.username, state.config.username_max_len).await {
        Ok(user) => Json(serde_json::json!({ "message": "username set", "user": user })).into_response(),
        Err(e) => account_error(&e),
    }
}

/// `GET /api/auth/username-available?username=x`.
pub async fn username_available(State(state): State<AppState>, Query(query): Query<AvailabilityQuery>) -> Response {
    match account::username_available(&state.pool, &query.username, state.config.username_max_len).await {
        Ok(available) => Json(serde_json::json!({ "available": available })).into_response(),
        Err(e) => account_error(&e),
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
