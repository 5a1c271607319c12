use super::*;
use crate::client::gateway::Session;

fn session(username: Option<&str>) -> Session {
    Session {
        user_id: "user-1".into(),
        email: "demo@x.com".into(),
        username: username.map(str::to_owned),
        token: "tok".into(),
    }
}

#[test]
fn loading_never_redirects() {
    assert_eq!(protected(&SessionState::Loading), GuardDecision::Pending);
    assert_eq!(public_only(&SessionState::Loading), GuardDecision::Pending);
}

#[test]
fn protected_redirects_unauthenticated_to_sign_in() {
    assert_eq!(
        protected(&SessionState::Unauthenticated),
        GuardDecision::Redirect(SIGN_IN_PATH.to_owned())
    );
}

#[test]
fn protected_allows_both_authenticated_states() {
    assert_eq!(
        protected(&SessionState::AuthenticatedNoUsername(session(None))),
        GuardDecision::Allow
    );
    assert_eq!(
        protected(&SessionState::AuthenticatedWithUsername(session(Some("demo_user")))),
        GuardDecision::Allow
    );
}

#[test]
fn public_only_allows_unauthenticated() {
    assert_eq!(public_only(&SessionState::Unauthenticated), GuardDecision::Allow);
}

#[test]
fn public_only_sends_incomplete_profiles_to_claim_step() {
    assert_eq!(
        public_only(&SessionState::AuthenticatedNoUsername(session(None))),
        GuardDecision::Redirect(CLAIM_USERNAME_PATH.to_owned())
    );
}

#[test]
fn public_only_sends_complete_profiles_home() {
    assert_eq!(
        public_only(&SessionState::AuthenticatedWithUsername(session(Some("demo_user")))),
        GuardDecision::Redirect("/demo_user".to_owned())
    );
}
