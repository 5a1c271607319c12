//! Route guards: pure decisions over the session state.
//!
//! Guards never redirect while the state is `Loading`; a pending decision
//! keeps the UI on a neutral screen until the session is resolved.

use super::store::{CLAIM_USERNAME_PATH, SIGN_IN_PATH, SessionState};

/// What the router should do with a guarded route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the guarded content.
    Allow,
    /// Session still resolving; render a neutral pending view.
    Pending,
    /// Navigate away instead of rendering.
    Redirect(String),
}

/// Guard for routes that require authentication. Unauthenticated visitors
/// go to the sign-in page.
#[must_use]
pub fn protected(state: &SessionState) -> GuardDecision {
    match state {
        SessionState::Loading => GuardDecision::Pending,
        SessionState::Unauthenticated => GuardDecision::Redirect(SIGN_IN_PATH.to_owned()),
        SessionState::AuthenticatedNoUsername(_) | SessionState::AuthenticatedWithUsername(_) => GuardDecision::Allow,
    }
}

/// Guard for routes only meaningful to signed-out visitors (sign-in,
/// sign-up pages). Signed-in users are sent to where they belong: the
/// claim step if they still need a handle, their profile otherwise.
#[must_use]
pub fn public_only(state: &SessionState) -> GuardDecision {
    match state {
        SessionState::Loading => GuardDecision::Pending,
        SessionState::Unauthenticated => GuardDecision::Allow,
        SessionState::AuthenticatedNoUsername(_) => GuardDecision::Redirect(CLAIM_USERNAME_PATH.to_owned()),
        SessionState::AuthenticatedWithUsername(session) => {
            let username = session.username.as_deref().unwrap_or("");
            GuardDecision::Redirect(format!("/{username}"))
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
