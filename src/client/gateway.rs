//! The `AuthGateway` trait: one interface over both identity providers.
//!
//! DESIGN
//! ======
//! Every operation that changes auth state returns a `SessionEvent` stamped
//! with a monotonically increasing version, and the same event is pushed on
//! the provider's broadcast channel. The `SessionStore` applies whichever
//! copy arrives first and discards the other by version, so a direct call
//! result racing a push notification can never roll the state backwards.
//! Failures are values: no gateway operation panics or throws across the
//! public boundary.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;

/// Typed failure taxonomy for every gateway operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Client-side rejection, before any network call.
    #[error("{0}")]
    Validation(String),
    /// The provider completed the request and said no.
    #[error("{0}")]
    Rejected(String),
    /// The request never completed.
    #[error("network failure: {0}")]
    Transport(String),
}

/// Proof of an authenticated actor, as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque identity assigned by the provider.
    pub user_id: String,
    pub email: String,
    /// `None` until the claim flow binds a handle.
    pub username: Option<String>,
    /// Bearer credential attached to authenticated requests.
    pub token: String,
}

impl Session {
    #[must_use]
    pub fn needs_username(&self) -> bool {
        self.username.as_deref().unwrap_or("").is_empty()
    }
}

/// A versioned session change. `session: None` means signed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub version: u64,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Taken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    GitHub,
    Google,
}

impl OAuthProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::Google => "google",
        }
    }
}

/// The authorize URL the host environment should navigate to. What happens
/// after the redirect is the provider's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthRedirect {
    pub url: String,
}

/// Uniform interface over the hosted identity service and the custom REST
/// backend.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Create an account. When `username` is given the claim happens as
    /// part of sign-up; otherwise the session starts without a handle.
    async fn sign_up(&self, email: &str, password: &str, username: Option<&str>) -> Result<SessionEvent, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionEvent, AuthError>;

    /// Produce the provider's authorize redirect for an OAuth sign-in.
    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<OAuthRedirect, AuthError>;

    /// Always clears the local credential; a failing remote call is logged
    /// and swallowed. The returned event is therefore always signed-out.
    async fn sign_out(&self) -> SessionEvent;

    /// "No matching record and no lookup error" is `Available`. Lookup
    /// errors surface as `Err`, never as `Taken`.
    async fn check_username(&self, username: &str) -> Result<Availability, AuthError>;

    /// One-time binding of a handle to the current account.
    async fn claim_username(&self, username: &str) -> Result<SessionEvent, AuthError>;

    /// Rehydrate from the persisted credential, if any.
    async fn current_session(&self) -> Result<SessionEvent, AuthError>;

    /// Push-based session-change notifications.
    fn events(&self) -> broadcast::Receiver<SessionEvent>;
}

// =============================================================================
// EVENT PUBLISHER
// =============================================================================

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Shared by provider implementations: stamps versions and fans events out
/// to subscribers.
pub(crate) struct EventPublisher {
    tx: broadcast::Sender<SessionEvent>,
    version: AtomicU64,
}

impl EventPublisher {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx, version: AtomicU64::new(0) }
    }

    /// Stamp the next version, broadcast, and return the event.
    pub(crate) fn publish(&self, session: Option<Session>) -> SessionEvent {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let event = SessionEvent { version, session };
        // No subscribers is fine; the direct-call return value still
        // carries the event.
        let _ = self.tx.send(event.clone());
        event
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

// =============================================================================
// TEST GATEWAY
// =============================================================================


#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
