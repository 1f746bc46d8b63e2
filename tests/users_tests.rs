mod common;

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode, header},
};
use common::*;

#[tokio::test]
async fn test_get_user_with_bearer() {
    let t = create_test_app().await;
    let pair = login(&t.app).await;

    let uri = format!("/users/{}", t.admin_id);
    let response = send(&t.app, bearer_request(&uri, Some(&pair.access_token))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::VARY).unwrap(),
        "Authorization"
    );

    let json: serde_json::Value = body_json(response).await;
    assert_eq!(json["id"], t.admin_id);
    assert_eq!(json["first_name"], "Admin");
    assert_eq!(json["last_name"], "User");
    assert_eq!(json["is_admin"], true);
    assert!(json.get("password_hash").is_none());
}

#[tokio::test]
async fn test_get_user_without_bearer() {
    let t = create_test_app().await;

    let response = send(&t.app, bearer_request("/users/1", None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::VARY).unwrap(),
        "Authorization"
    );
}

#[tokio::test]
async fn test_get_user_malformed_header() {
    let t = create_test_app().await;
    let pair = login(&t.app).await;

    for value in [
        pair.access_token.clone(),
        format!("Token {}", pair.access_token),
        format!("Bearer  {}", pair.access_token),
        format!("Bearer {} extra", pair.access_token),
    ] {
        let request = Request::builder()
            .uri("/users/1")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let response = send(&t.app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_non_utf8_auth_header_is_malformed() {
    let t = create_test_app().await;

    let request = Request::builder()
        .uri("/users/1")
        .header(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        )
        .body(Body::empty())
        .unwrap();
    let response = send(&t.app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = body_json(response).await;
    assert_eq!(json["error"], "invalid auth header");
}

#[tokio::test]
async fn test_get_user_without_bearer_reports_missing_header() {
    let t = create_test_app().await;

    let response = send(&t.app, bearer_request("/users/1", None)).await;

    let json: serde_json::Value = body_json(response).await;
    assert_eq!(json["error"], "no auth header");
}

#[tokio::test]
async fn test_get_user_with_refresh_token_as_bearer() {
    let t = create_test_app().await;
    let pair = login(&t.app).await;

    let response = send(&t.app, bearer_request("/users/1", Some(&pair.refresh_token))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_unknown_user() {
    let t = create_test_app().await;
    let pair = login(&t.app).await;

    let response = send(&t.app, bearer_request("/users/9999", Some(&pair.access_token))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_user_non_numeric_id() {
    let t = create_test_app().await;
    let pair = login(&t.app).await;

    let response = send(&t.app, bearer_request("/users/abc", Some(&pair.access_token))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_current_user_claims() {
    let t = create_test_app().await;
    let pair = login(&t.app).await;

    let response = send(&t.app, bearer_request("/users/me", Some(&pair.access_token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let claims: serde_json::Value = body_json(response).await;
    assert_eq!(claims["sub"], t.admin_id.to_string());
    assert_eq!(claims["name"], "Admin User");
    assert_eq!(claims["admin"], true);
    assert_eq!(claims["iss"], TEST_DOMAIN);
    assert_eq!(claims["aud"], TEST_DOMAIN);
    assert!(claims["exp"].as_u64().is_some());
}
