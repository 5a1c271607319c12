//! `AuthGateway` over the custom REST backend.
//!
//! The bearer token from login/register is persisted in `ClientStorage`
//! and attached to every authenticated request. Sign-out clears it first
//! and only then tells the server; a failing remote call cannot keep the
//! client signed in.

use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;

use super::gateway::{
    AuthError, AuthGateway, Availability, EventPublisher, OAuthProvider, OAuthRedirect, Session, SessionEvent,
};
use super::storage::ClientStorage;

pub struct RestGateway {
    base_url: String,
    http: reqwest::Client,
    storage: ClientStorage,
    token: RwLock<Option<String>>,
    publisher: EventPublisher,
}

// =============================================================================
// WIRE SHAPES
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct UserBody {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponseBody {
    pub access_token: String,
    pub user: UserBody,
}

#[derive(Debug, Deserialize)]
struct SelectUsernameResponse {
    user: UserBody,
}

#[derive(Debug, Deserialize)]
struct AvailabilityBody {
    available: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

pub(crate) fn session_from_user(user: &UserBody, token: &str) -> Session {
    let username = user.username.as_deref().filter(|u| !u.is_empty()).map(str::to_owned);
    Session { user_id: user.id.clone(), email: user.email.clone(), username, token: token.to_owned() }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

pub(crate) fn parse_error_detail(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.detail)
        .unwrap_or_else(|_| format!("request failed with status {status}"))
}

impl RestGateway {
    /// Build a gateway for `base_url`, rehydrating the persisted token.
    #[must_use]
    pub fn new(base_url: impl Into<String>, storage: ClientStorage) -> Self {
        let token = match storage.token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted token");
                None
            }
        };
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            storage,
            token: RwLock::new(token),
            publisher: EventPublisher::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    fn remember_token(&self, token: &str) {
        *self.token.write().expect("token lock poisoned") = Some(token.to_owned());
        if let Err(e) = self.storage.set_token(token) {
            tracing::warn!(error = %e, "could not persist token");
        }
    }

    fn forget_token(&self) {
        *self.token.write().expect("token lock poisoned") = None;
        if let Err(e) = self.storage.clear_token() {
            tracing::warn!(error = %e, "could not clear persisted token");
        }
    }

    async fn rejection(response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        AuthError::Rejected(parse_error_detail(status, &body))
    }

    async fn post_credentials(&self, path: &str, body: serde_json::Value) -> Result<AuthResponseBody, AuthError> {
        let response = self
            .http
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        response
            .json::<AuthResponseBody>()
            .await
            .map_err(|e| AuthError::Transport(format!("malformed response: {e}")))
    }

    async fn claim_remote(&self, token: &str, username: &str) -> Result<UserBody, AuthError> {
        let response = self
            .http
            .post(self.url("/api/auth/select-username"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "username": username }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        response
            .json::<SelectUsernameResponse>()
            .await
            .map(|r| r.user)
            .map_err(|e| AuthError::Transport(format!("malformed response: {e}")))
    }
}

#[async_trait]
impl AuthGateway for RestGateway {
    async fn sign_up(&self, email: &str, password: &str, username: Option<&str>) -> Result<SessionEvent, AuthError> {
        let body = self
            .post_credentials(
                "/api/auth/register",
                serde_json::json!({ "email": email, "password": password, "full_name": "" }),
            )
            .await?;
        self.remember_token(&body.access_token);
        let mut session = session_from_user(&body.user, &body.access_token);

        if let Some(name) = username {
            match self.claim_remote(&body.access_token, name).await {
                Ok(user) => session = session_from_user(&user, &body.access_token),
                Err(e) => {
                    // Signed in, handle not bound. Surface the claim error
                    // but let the session event through so the store lands
                    // in the no-username state.
                    self.publisher.publish(Some(session));
                    return Err(e);
                }
            }
        }

        Ok(self.publisher.publish(Some(session)))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionEvent, AuthError> {
        let body = self
            .post_credentials("/api/auth/login", serde_json::json!({ "email": email, "password": password }))
            .await?;
        self.remember_token(&body.access_token);
        let session = session_from_user(&body.user, &body.access_token);
        Ok(self.publisher.publish(Some(session)))
    }

    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<OAuthRedirect, AuthError> {
        // The REST backend does its own credential checks and has no OAuth
        // surface; the hosted provider covers that flow.
        Err(AuthError::Rejected(format!(
            "{} sign-in is not supported by this backend",
            provider.as_str()
        )))
    }

    async fn sign_out(&self) -> SessionEvent {
        let token = self.current_token();
        self.forget_token();

        if let Some(token) = token {
            let result = self
                .http
                .post(self.url("/api/auth/logout"))
                .bearer_auth(&token)
                .send()
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "remote sign-out failed; local session cleared anyway");
            }
        }

        self.publisher.publish(None)
    }

    async fn check_username(&self, username: &str) -> Result<Availability, AuthError> {
        let response = self
            .http
            .get(self.url("/api/auth/username-available"))
            .query(&[("username", username)])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let body = response
            .json::<AvailabilityBody>()
            .await
            .map_err(|e| AuthError::Transport(format!("malformed response: {e}")))?;
        Ok(if body.available { Availability::Available } else { Availability::Taken })
    }

    async fn claim_username(&self, username: &str) -> Result<SessionEvent, AuthError> {
        let Some(token) = self.current_token() else {
            return Err(AuthError::Rejected("not signed in".into()));
        };
        let user = self.claim_remote(&token, username).await?;
        let session = session_from_user(&user, &token);
        Ok(self.publisher.publish(Some(session)))
    }

    async fn current_session(&self) -> Result<SessionEvent, AuthError> {
        let Some(token) = self.current_token() else {
            return Ok(self.publisher.publish(None));
        };

        let response = self
            .http
            .get(self.url("/api/auth/me"))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Token expired or revoked; the stored credential is useless.
            self.forget_token();
            return Ok(self.publisher.publish(None));
        }
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let user = response
            .json::<UserBody>()
            .await
            .map_err(|e| AuthError::Transport(format!("malformed response: {e}")))?;
        let session = session_from_user(&user, &token);
        Ok(self.publisher.publish(Some(session)))
    }

    fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.publisher.subscribe()
    }
}

#[cfg(test)]
#[path = "rest_test.rs"]
mod tests;
