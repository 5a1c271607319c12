use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::time::timeout;

use super::*;
use crate::client::gateway::test_helpers::MockGateway;

fn new_store() -> (Arc<MockGateway>, SessionStore) {
    let gateway = Arc::new(MockGateway::new());
    let store = SessionStore::new(gateway.clone());
    (gateway, store)
}

async fn wait_for_change(rx: &mut tokio::sync::watch::Receiver<SessionState>) {
    timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("state change timed out")
        .expect("watch channel closed");
}

#[tokio::test]
async fn starts_loading() {
    let (_gateway, store) = new_store();
    assert_eq!(store.state(), SessionState::Loading);
}

#[tokio::test]
async fn init_without_session_settles_unauthenticated() {
    let (_gateway, store) = new_store();
    store.init().await;
    assert_eq!(store.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn sign_up_then_claim_end_to_end() {
    let (_gateway, store) = new_store();
    store.init().await;

    store.sign_up("demo@x.com", "demo123", None).await.unwrap();
    assert!(matches!(store.state(), SessionState::AuthenticatedNoUsername(_)));
    assert_eq!(store.navigation_target().as_deref(), Some(CLAIM_USERNAME_PATH));

    let path = store.claim_username("demo_user").await.unwrap();
    assert_eq!(path, "/demo_user");
    assert!(matches!(store.state(), SessionState::AuthenticatedWithUsername(_)));
    assert_eq!(store.state().username(), Some("demo_user"));
    assert_eq!(store.navigation_target().as_deref(), Some("/demo_user"));
}

#[tokio::test]
async fn sign_up_with_username_lands_with_username() {
    let (_gateway, store) = new_store();
    store.init().await;

    store.sign_up("demo@x.com", "demo123", Some("demo_user")).await.unwrap();
    assert!(matches!(store.state(), SessionState::AuthenticatedWithUsername(_)));
    assert_eq!(store.navigation_target().as_deref(), Some("/demo_user"));
}

#[tokio::test]
async fn claiming_taken_username_leaves_state_untouched() {
    let (gateway, store) = new_store();
    gateway.seed_account("other@x.com", "pw1234", Some("demo_user"));
    store.init().await;
    store.sign_up("demo@x.com", "demo123", None).await.unwrap();
    let before = store.state();

    let err = store.claim_username("demo_user").await.unwrap_err();
    assert!(matches!(err, AuthError::Rejected(_)));
    assert_eq!(store.state(), before);
    assert!(matches!(store.state(), SessionState::AuthenticatedNoUsername(_)));
}

#[tokio::test]
async fn claim_rejects_bad_syntax_before_any_network_call() {
    let (gateway, store) = new_store();
    store.init().await;
    store.sign_up("demo@x.com", "demo123", None).await.unwrap();

    // Lookup would fail loudly; a Validation error proves we never got there.
    gateway.fail_lookup.store(true, Ordering::SeqCst);
    let err = store.claim_username("no spaces").await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
    let err = store.check_username("ab").await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}

#[tokio::test]
async fn sign_out_lands_unauthenticated_even_when_remote_fails() {
    let (gateway, store) = new_store();
    store.init().await;
    store.sign_up("demo@x.com", "demo123", Some("demo_user")).await.unwrap();

    gateway.fail_remote_sign_out.store(true, Ordering::SeqCst);
    let target = store.sign_out().await;
    assert_eq!(target, LANDING_PATH);
    assert_eq!(store.state(), SessionState::Unauthenticated);

    // The credential really is gone: rehydrating finds nothing.
    store.init().await;
    assert_eq!(store.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn rehydration_restores_authenticated_state() {
    let gateway = Arc::new(MockGateway::new());
    gateway.seed_account("demo@x.com", "demo123", Some("demo_user"));
    gateway.seed_session("demo@x.com");

    let store = SessionStore::new(gateway.clone());
    store.init().await;
    assert!(matches!(store.state(), SessionState::AuthenticatedWithUsername(_)));
    assert_eq!(store.state().username(), Some("demo_user"));
}

#[tokio::test]
async fn stale_update_is_discarded() {
    let (_gateway, store) = new_store();
    let newer = SessionEvent { version: 5, session: None };
    let stale = SessionEvent {
        version: 3,
        session: Some(Session {
            user_id: "user-1".into(),
            email: "demo@x.com".into(),
            username: Some("demo_user".into()),
            token: "tok".into(),
        }),
    };

    store.apply_event(&newer);
    assert_eq!(store.state(), SessionState::Unauthenticated);

    // Arrives late, must not roll the state back.
    store.apply_event(&stale);
    assert_eq!(store.state(), SessionState::Unauthenticated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_stale_and_fresh_updates_converge_on_newest() {
    // The stale event carries a signed-in session so an out-of-order win
    // would be visible as a wrong final state.
    for _ in 0..500 {
        let (_gateway, store) = new_store();
        let store = Arc::new(store);
        let stale = SessionEvent {
            version: 1,
            session: Some(Session {
                user_id: "user-1".into(),
                email: "demo@x.com".into(),
                username: Some("demo_user".into()),
                token: "tok".into(),
            }),
        };
        let fresh = SessionEvent { version: 2, session: None };

        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.apply_event(&stale) })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.apply_event(&fresh) })
        };
        a.await.unwrap();
        b.await.unwrap();

        assert_eq!(store.state(), SessionState::Unauthenticated);
    }
}

#[tokio::test]
async fn duplicate_version_applies_once() {
    let (_gateway, store) = new_store();
    let event = SessionEvent { version: 1, session: None };
    store.apply_event(&event);
    let mut rx = store.subscribe();
    rx.mark_unchanged();
    store.apply_event(&event);
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn provider_push_signs_the_store_out() {
    let (gateway, store) = new_store();
    store.init().await;
    store.sign_up("demo@x.com", "demo123", Some("demo_user")).await.unwrap();
    let mut rx = store.subscribe();

    // Token expiry notification from the provider.
    gateway.push_event(None);
    wait_for_change(&mut rx).await;
    assert_eq!(store.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn shutdown_stops_listening_to_pushes() {
    let (gateway, store) = new_store();
    store.init().await;
    store.sign_up("demo@x.com", "demo123", Some("demo_user")).await.unwrap();

    store.shutdown();
    gateway.push_event(None);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(matches!(store.state(), SessionState::AuthenticatedWithUsername(_)));
}

#[tokio::test]
async fn sign_in_failure_leaves_state_untouched() {
    let (gateway, store) = new_store();
    gateway.seed_account("demo@x.com", "demo123", Some("demo_user"));
    store.init().await;

    let err = store.sign_in("demo@x.com", "wrong-password").await.unwrap_err();
    assert!(matches!(err, AuthError::Rejected(_)));
    assert_eq!(store.state(), SessionState::Unauthenticated);

    store.sign_in("demo@x.com", "demo123").await.unwrap();
    assert!(matches!(store.state(), SessionState::AuthenticatedWithUsername(_)));
}
