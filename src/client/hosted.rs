//! `AuthGateway` over a hosted identity service (GoTrue/PostgREST-style
//! HTTP surface).
//!
//! The service owns credential verification and token issuance; profiles
//! live in a `profiles` table reachable through the REST query interface,
//! where `username=eq.{name}` filters by the unique handle. The chosen
//! username also rides along in the auth user's metadata so a session can
//! be classified without a second lookup.

use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;

use super::gateway::{
    AuthError, AuthGateway, Availability, EventPublisher, OAuthProvider, OAuthRedirect, Session, SessionEvent,
};
use super::storage::ClientStorage;

pub struct HostedGateway {
    base_url: String,
    anon_key: String,
    /// Where the OAuth callback lands after the provider round-trip.
    redirect_url: String,
    http: reqwest::Client,
    storage: ClientStorage,
    token: RwLock<Option<String>>,
    publisher: EventPublisher,
}

// =============================================================================
// WIRE SHAPES
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HostedMetadata {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HostedUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<HostedMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub user: Option<HostedUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileRow {
    #[allow(dead_code)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct HostedErrorBody {
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
}

pub(crate) fn session_from_hosted(user: &HostedUser, token: &str) -> Session {
    let username = user
        .user_metadata
        .as_ref()
        .and_then(|m| m.username.as_deref())
        .filter(|u| !u.is_empty())
        .map(str::to_owned);
    Session {
        user_id: user.id.clone(),
        email: user.email.clone().unwrap_or_default(),
        username,
        token: token.to_owned(),
    }
}

pub(crate) fn authorize_url(base: &str, provider: OAuthProvider, redirect: &str) -> String {
    format!(
        "{}/auth/v1/authorize?provider={}&redirect_to={redirect}",
        base.trim_end_matches('/'),
        provider.as_str()
    )
}

/// "No matching record and no error" is available.
pub(crate) fn availability_from_rows(rows: &[ProfileRow]) -> Availability {
    if rows.is_empty() { Availability::Available } else { Availability::Taken }
}

/// Hosted error bodies are loosely shaped; try the known fields in order.
pub(crate) fn hosted_error_detail(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<HostedErrorBody>(body)
        .ok()
        .and_then(|b| b.msg.or(b.error_description).or(b.message))
        .unwrap_or_else(|| format!("request failed with status {status}"))
}

impl HostedGateway {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        redirect_url: impl Into<String>,
        storage: ClientStorage,
    ) -> Self {
        let token = match storage.token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted token");
                None
            }
        };
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            redirect_url: redirect_url.into(),
            http: reqwest::Client::new(),
            storage,
            token: RwLock::new(token),
            publisher: EventPublisher::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
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
        AuthError::Rejected(hosted_error_detail(status, &body))
    }

    async fn credential_grant(&self, path: &str, body: serde_json::Value) -> Result<SessionEvent, AuthError> {
        let response = self
            .http
            .post(self.url(path))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let grant = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::Transport(format!("malformed response: {e}")))?;
        let (Some(token), Some(user)) = (grant.access_token, grant.user) else {
            // Typical when the project requires email confirmation: the
            // account exists but there is no session yet.
            return Err(AuthError::Rejected("account created; email confirmation required".into()));
        };

        self.remember_token(&token);
        let session = session_from_hosted(&user, &token);
        Ok(self.publisher.publish(Some(session)))
    }

    async fn fetch_user(&self, token: &str) -> Result<reqwest::Response, AuthError> {
        self.http
            .get(self.url("/auth/v1/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))
    }
}

#[async_trait]
impl AuthGateway for HostedGateway {
    async fn sign_up(&self, email: &str, password: &str, username: Option<&str>) -> Result<SessionEvent, AuthError> {
        let mut body = serde_json::json!({ "email": email, "password": password });
        if let Some(name) = username {
            body["data"] = serde_json::json!({ "username": name });
        }
        self.credential_grant("/auth/v1/signup", body).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionEvent, AuthError> {
        self.credential_grant(
            "/auth/v1/token?grant_type=password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<OAuthRedirect, AuthError> {
        Ok(OAuthRedirect { url: authorize_url(&self.base_url, provider, &self.redirect_url) })
    }

    async fn sign_out(&self) -> SessionEvent {
        let token = self.current_token();
        self.forget_token();

        if let Some(token) = token {
            let result = self
                .http
                .post(self.url("/auth/v1/logout"))
                .header("apikey", &self.anon_key)
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
            .get(self.url("/rest/v1/profiles"))
            .header("apikey", &self.anon_key)
            .query(&[("username", format!("eq.{username}")), ("select", "username".to_owned())])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let rows = response
            .json::<Vec<ProfileRow>>()
            .await
            .map_err(|e| AuthError::Transport(format!("malformed response: {e}")))?;
        Ok(availability_from_rows(&rows))
    }

    async fn claim_username(&self, username: &str) -> Result<SessionEvent, AuthError> {
        let Some(token) = self.current_token() else {
            return Err(AuthError::Rejected("not signed in".into()));
        };
        if self.check_username(username).await? == Availability::Taken {
            return Err(AuthError::Rejected("username already taken".into()));
        }

        // Bind the handle in the auth user's metadata...
        let response = self
            .http
            .put(self.url("/auth/v1/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .json(&serde_json::json!({ "data": { "username": username } }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let user = response
            .json::<HostedUser>()
            .await
            .map_err(|e| AuthError::Transport(format!("malformed response: {e}")))?;

        // ...and mirror it into the public profiles table, where the
        // uniqueness constraint lives.
        let upsert = self
            .http
            .post(self.url("/rest/v1/profiles"))
            .header("apikey", &self.anon_key)
            .header("Prefer", "resolution=merge-duplicates")
            .bearer_auth(&token)
            .json(&serde_json::json!({ "id": user.id, "username": username }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        if !upsert.status().is_success() {
            return Err(Self::rejection(upsert).await);
        }

        let session = session_from_hosted(&user, &token);
        Ok(self.publisher.publish(Some(session)))
    }

    async fn current_session(&self) -> Result<SessionEvent, AuthError> {
        let Some(token) = self.current_token() else {
            return Ok(self.publisher.publish(None));
        };

        let response = self.fetch_user(&token).await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.forget_token();
            return Ok(self.publisher.publish(None));
        }
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let user = response
            .json::<HostedUser>()
            .await
            .map_err(|e| AuthError::Transport(format!("malformed response: {e}")))?;
        let session = session_from_hosted(&user, &token);
        Ok(self.publisher.publish(Some(session)))
    }

    fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.publisher.subscribe()
    }
}

#[cfg(test)]
#[path = "hosted_test.rs"]
mod tests;
