//! The session store: the app-wide auth state machine.
//!
//! DESIGN
//! ======
//! States: `Loading -> {Unauthenticated, AuthenticatedNoUsername,
//! AuthenticatedWithUsername}`. The store is the single writer; every
//! mutation goes through `apply`, which discards updates older than the
//! last applied version. Push notifications from the provider and direct
//! call results both funnel into the same path, so they can race freely —
//! the newest version wins regardless of arrival order.
//!
//! UI code observes the state through a `watch` channel. The background
//! listener task is aborted on `shutdown`/`Drop`, so the provider
//! subscription never outlives the store.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::gateway::{AuthGateway, AuthError, Availability, OAuthProvider, OAuthRedirect, Session, SessionEvent};
use crate::services::username::validate_username;

pub const SIGN_IN_PATH: &str = "/login";
pub const CLAIM_USERNAME_PATH: &str = "/select-username";
pub const LANDING_PATH: &str = "/";

/// Observable auth state. `Loading` only exists between construction and
/// the first applied update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Unauthenticated,
    AuthenticatedNoUsername(Session),
    AuthenticatedWithUsername(Session),
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::AuthenticatedNoUsername(_) | Self::AuthenticatedWithUsername(_))
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::AuthenticatedWithUsername(session) => session.username.as_deref(),
            _ => None,
        }
    }

    fn from_session(session: Option<Session>) -> Self {
        match session {
            None => Self::Unauthenticated,
            Some(s) if s.needs_username() => Self::AuthenticatedNoUsername(s),
            Some(s) => Self::AuthenticatedWithUsername(s),
        }
    }
}

struct Inner {
    state_tx: watch::Sender<SessionState>,
    last_version: Mutex<u64>,
}

impl Inner {
    /// Apply a versioned update. Stale or duplicate versions are discarded,
    /// which makes the store idempotent under the push/direct-call race.
    /// The version check and the publish sit in one critical section, so a
    /// stale event that passes the check cannot overwrite a newer state
    /// published in between.
    fn apply(&self, event: &SessionEvent) {
        let mut last = self.last_version.lock().expect("version lock poisoned");
        if event.version <= *last {
            return;
        }
        *last = event.version;
        let next = SessionState::from_session(event.session.clone());
        // send_replace: the state must advance even with no subscribers.
        let _ = self.state_tx.send_replace(next);
    }

    /// Fallback when rehydration itself fails: only moves `Loading` to
    /// `Unauthenticated`, and consumes no version so later real events
    /// still apply.
    fn settle_unauthenticated(&self) {
        self.state_tx.send_if_modified(|state| {
            if *state == SessionState::Loading {
                *state = SessionState::Unauthenticated;
                true
            } else {
                false
            }
        });
    }
}

/// Owns the auth state for the lifetime of the application.
pub struct SessionStore {
    gateway: Arc<dyn AuthGateway>,
    inner: Arc<Inner>,
    listener: JoinHandle<()>,
}

impl SessionStore {
    /// Build the store in `Loading` and start listening to provider pushes.
    #[must_use]
    pub fn new(gateway: Arc<dyn AuthGateway>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Loading);
        let inner = Arc::new(Inner { state_tx, last_version: Mutex::new(0) });

        let listener = tokio::spawn(listen(gateway.events(), Arc::clone(&inner)));

        Self { gateway, inner, listener }
    }

    /// Resolve the persisted session, moving out of `Loading`. A transport
    /// failure settles as `Unauthenticated` rather than wedging the UI.
    pub async fn init(&self) {
        match self.gateway.current_session().await {
            Ok(event) => self.inner.apply(&event),
            Err(e) => {
                tracing::warn!(error = %e, "session rehydration failed");
                self.inner.settle_unauthenticated();
            }
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state_tx.borrow().clone()
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure; state is untouched on error.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let event = self.gateway.sign_in(email, password).await?;
        self.inner.apply(&event);
        Ok(())
    }

    /// Create an account, optionally claiming a username during sign-up.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure; state is untouched on error.
    pub async fn sign_up(&self, email: &str, password: &str, username: Option<&str>) -> Result<(), AuthError> {
        if let Some(name) = username {
            validate_username(name).map_err(|e| AuthError::Validation(e.to_string()))?;
        }
        let event = self.gateway.sign_up(email, password, username).await?;
        self.inner.apply(&event);
        Ok(())
    }

    /// Hand back the provider's authorize URL for an OAuth sign-in.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<OAuthRedirect, AuthError> {
        self.gateway.sign_in_with_oauth(provider).await
    }

    /// Sign out. Always lands in `Unauthenticated`, even when the remote
    /// call fails, and reports the landing page as the navigation target.
    pub async fn sign_out(&self) -> &'static str {
        let event = self.gateway.sign_out().await;
        self.inner.apply(&event);
        LANDING_PATH
    }

    /// Syntactic check plus provider availability lookup.
    ///
    /// # Errors
    ///
    /// `Validation` before any network call for malformed names; lookup
    /// failures propagate distinctly from `Taken`.
    pub async fn check_username(&self, username: &str) -> Result<Availability, AuthError> {
        validate_username(username).map_err(|e| AuthError::Validation(e.to_string()))?;
        self.gateway.check_username(username).await
    }

    /// The one-time username claim. On success the state moves to
    /// `AuthenticatedWithUsername` and the new profile path is returned for
    /// navigation. On failure the state is untouched so the form can offer
    /// a retry.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed names (no network call), `Rejected` for
    /// taken names, `Transport` when the request never completed.
    pub async fn claim_username(&self, username: &str) -> Result<String, AuthError> {
        validate_username(username).map_err(|e| AuthError::Validation(e.to_string()))?;
        let event = self.gateway.claim_username(username).await?;
        self.inner.apply(&event);
        Ok(format!("/{username}"))
    }

    /// Where an interactive sign-in should land: the profile page when a
    /// username is known, the claim step otherwise.
    #[must_use]
    pub fn navigation_target(&self) -> Option<String> {
        match self.state() {
            SessionState::AuthenticatedWithUsername(session) => {
                session.username.map(|name| format!("/{name}"))
            }
            SessionState::AuthenticatedNoUsername(_) => Some(CLAIM_USERNAME_PATH.to_owned()),
            SessionState::Loading | SessionState::Unauthenticated => None,
        }
    }

    /// Stop the listener task. Also happens on `Drop`.
    pub fn shutdown(&self) {
        self.listener.abort();
    }

    /// Deliver an event directly, bypassing the listener. Lets tests pick
    /// the arrival order of racing updates.
    #[cfg(test)]
    pub(crate) fn apply_event(&self, event: &SessionEvent) {
        self.inner.apply(event);
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn listen(mut events: broadcast::Receiver<SessionEvent>, inner: Arc<Inner>) {
    loop {
        match events.recv().await {
            Ok(event) => inner.apply(&event),
            // Missed events are fine: versions are monotonic, so the next
            // event carries the newest state.
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "session event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
