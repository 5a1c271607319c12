use super::*;

#[test]
fn join_url_handles_trailing_slash() {
    assert_eq!(join_url("http://localhost:3000", "/api/auth/me"), "http://localhost:3000/api/auth/me");
    assert_eq!(join_url("http://localhost:3000/", "/api/auth/me"), "http://localhost:3000/api/auth/me");
}

#[test]
fn auth_response_parses_login_payload() {
    let body: AuthResponseBody = serde_json::from_str(
        r#"{
            "access_token": "tok123",
            "token_type": "bearer",
            "user": {
                "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
                "email": "demo@x.com",
                "username": "demo_user",
                "full_name": "Demo User",
                "bio": "",
                "avatar_url": "",
                "saldo": 0,
                "level": "Basic",
                "created_at": "2024-01-01T00:00:00",
                "is_active": true
            },
            "needs_username": false
        }"#,
    )
    .unwrap();
    assert_eq!(body.access_token, "tok123");
    assert_eq!(body.user.username.as_deref(), Some("demo_user"));
}

#[test]
fn auth_response_parses_null_username() {
    let body: AuthResponseBody = serde_json::from_str(
        r#"{
            "access_token": "tok123",
            "user": { "id": "u1", "email": "demo@x.com", "username": null }
        }"#,
    )
    .unwrap();
    assert!(body.user.username.is_none());
}

#[test]
fn session_from_user_treats_empty_username_as_unclaimed() {
    let user = UserBody { id: "u1".into(), email: "demo@x.com".into(), username: Some(String::new()) };
    let session = session_from_user(&user, "tok");
    assert!(session.username.is_none());
    assert!(session.needs_username());
}

#[test]
fn session_from_user_keeps_claimed_username() {
    let user = UserBody { id: "u1".into(), email: "demo@x.com".into(), username: Some("demo_user".into()) };
    let session = session_from_user(&user, "tok");
    assert_eq!(session.username.as_deref(), Some("demo_user"));
    assert_eq!(session.token, "tok");
    assert_eq!(session.user_id, "u1");
}

#[test]
fn error_detail_prefers_server_message() {
    let detail = parse_error_detail(
        reqwest::StatusCode::CONFLICT,
        r#"{"detail": "username already taken"}"#,
    );
    assert_eq!(detail, "username already taken");
}

#[test]
fn error_detail_falls_back_to_status() {
    let detail = parse_error_detail(reqwest::StatusCode::BAD_GATEWAY, "<html>oops</html>");
    assert!(detail.contains("502"));
}

#[tokio::test]
async fn rehydration_without_token_is_signed_out() {
    let dir = tempfile::tempdir().unwrap();
    let storage = crate::client::storage::ClientStorage::new(dir.path().join("state.json"));
    let gateway = RestGateway::new("http://localhost:3000", storage);

    // No token persisted: resolves locally, no network involved.
    let event = gateway.current_session().await.unwrap();
    assert!(event.session.is_none());
}

#[tokio::test]
async fn constructor_picks_up_persisted_token() {
    let dir = tempfile::tempdir().unwrap();
    let storage = crate::client::storage::ClientStorage::new(dir.path().join("state.json"));
    storage.set_token("persisted").unwrap();

    let gateway = RestGateway::new("http://localhost:3000", storage);
    assert_eq!(gateway.current_token().as_deref(), Some("persisted"));
}

#[tokio::test]
async fn oauth_is_rejected_not_panicked() {
    let dir = tempfile::tempdir().unwrap();
    let storage = crate::client::storage::ClientStorage::new(dir.path().join("state.json"));
    let gateway = RestGateway::new("http://localhost:3000", storage);

    let err = gateway.sign_in_with_oauth(OAuthProvider::GitHub).await.unwrap_err();
    assert!(matches!(err, AuthError::Rejected(_)));
}
