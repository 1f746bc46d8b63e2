#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use std::time::Duration;
use tokenpair::{
    ServerConfig, create_app,
    db::{Database, NewUser, hash_password},
    jwt::{TokenLifetimes, TokenPair},
};
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-with-enough-bytes!";
pub const TEST_DOMAIN: &str = "example.com";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "secret";
pub const CLIENT_IP: &str = "127.0.0.1";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub admin_id: i64,
}

/// App with default token lifetimes.
pub async fn create_test_app() -> TestApp {
    create_test_app_with(TokenLifetimes::default()).await
}

/// App with a seeded admin ("Admin User", admin@example.com / secret).
pub async fn create_test_app_with(lifetimes: TokenLifetimes) -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");

    let hash = hash_password(ADMIN_PASSWORD).expect("Failed to hash password");
    let admin_id = db
        .users()
        .create(NewUser {
            first_name: "Admin",
            last_name: "User",
            email: ADMIN_EMAIL,
            password_hash: &hash,
            is_admin: true,
        })
        .await
        .expect("Failed to seed admin");

    let config = ServerConfig {
        db: db.clone(),
        domain: TEST_DOMAIN.to_string(),
        cookie_domain: "localhost".to_string(),
        jwt_secret: TEST_SECRET.to_vec(),
        lifetimes,
        refresh_window: Duration::from_secs(30),
    };

    TestApp {
        app: create_app(&config),
        db,
        admin_id,
    }
}

/// Refresh tokens short enough to sit inside the 30 second refresh window.
pub fn short_refresh_lifetimes() -> TokenLifetimes {
    TokenLifetimes {
        access: Duration::from_secs(15 * 60),
        refresh: Duration::from_secs(20),
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn login_request(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", CLIENT_IP)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn admin_credentials() -> String {
    serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }).to_string()
}

pub async fn login(app: &Router) -> TokenPair {
    let response = send(app, login_request("/auth", &admin_credentials())).await;
    assert_eq!(response.status(), 200);
    body_json(response).await
}

pub fn refresh_form_request(refresh_token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/refresh-token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("refresh_token={}", refresh_token)))
        .unwrap()
}

pub fn cookie_refresh_request(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/web/refresh");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn bearer_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn set_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` part of a `Set-Cookie` header, usable as a `Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().trim().to_string()
}
