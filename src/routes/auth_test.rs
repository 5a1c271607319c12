use axum::http::HeaderValue;

use super::*;

fn headers_with_auth(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
}

#[test]
fn bearer_token_extracts_value() {
    let headers = headers_with_auth("Bearer abc123");
    assert_eq!(bearer_token(&headers), Some("abc123"));
}

#[test]
fn bearer_token_trims_whitespace() {
    let headers = headers_with_auth("Bearer   abc123  ");
    assert_eq!(bearer_token(&headers), Some("abc123"));
}

#[test]
fn bearer_token_missing_header() {
    assert_eq!(bearer_token(&HeaderMap::new()), None);
}

#[test]
fn bearer_token_rejects_other_schemes() {
    let headers = headers_with_auth("Basic dXNlcjpwYXNz");
    assert_eq!(bearer_token(&headers), None);
}

#[test]
fn bearer_token_rejects_empty_token() {
    let headers = headers_with_auth("Bearer ");
    assert_eq!(bearer_token(&headers), None);
}

#[test]
fn status_mapping_covers_error_taxonomy() {
    use crate::services::account::AccountError as E;
    use crate::services::username::UsernameError;

    assert_eq!(status_for(&E::InvalidEmail), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(&E::WeakPassword), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(&E::EmailTaken), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(&E::InvalidUsername(UsernameError::TooShort)), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(&E::InvalidCredentials), StatusCode::UNAUTHORIZED);
    assert_eq!(status_for(&E::AccountDisabled), StatusCode::UNAUTHORIZED);
    assert_eq!(status_for(&E::UsernameTaken), StatusCode::CONFLICT);
    assert_eq!(status_for(&E::UsernameAlreadySet), StatusCode::CONFLICT);
    assert_eq!(status_for(&E::NotFound), StatusCode::NOT_FOUND);
    assert_eq!(status_for(&E::Hash("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn auth_response_serializes_bearer_shape() {
    let user = crate::services::account::PublicProfile {
        id: uuid::Uuid::new_v4(),
        email: "demo@x.com".into(),
        username: None,
        full_name: "Demo".into(),
        bio: String::new(),
        avatar_url: String::new(),
        saldo: 0,
        level: "Basic".into(),
        created_at: "2024-01-01T00:00:00".into(),
        is_active: true,
    };
    let needs_username = user.needs_username();
    let response = AuthResponse { access_token: "tok".into(), token_type: "bearer", user, needs_username };
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["token_type"], "bearer");
    assert_eq!(json["access_token"], "tok");
    assert_eq!(json["needs_username"], true);
    assert!(json["user"]["email"].is_string());
}

#[test]
fn register_body_defaults_full_name() {
    let body: RegisterBody = serde_json::from_str(r#"{"email": "demo@x.com", "password": "demo123"}"#).unwrap();
    assert_eq!(body.full_name, "");
}
