//! Token endpoints.
//!
//! - POST `/auth` - Exchange email/password for a token pair (also sets the refresh cookie)
//! - POST `/refresh-token` - Exchange a refresh token form field for a new pair
//! - POST `/web/auth` - Browser login, same as `/auth`
//! - GET `/web/refresh` - Exchange the refresh cookie for a new pair
//! - GET `/web/logout` - Clear the refresh cookie

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Form, State, rejection::FormRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::error::{ApiError, ResultExt};
use crate::auth::{REFRESH_COOKIE_NAME, Refresher, get_cookie};
use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::rate_limit::{RateLimitConfig, rate_limit_login};

#[derive(Clone)]
pub struct TokensState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub refresher: Refresher<Database>,
    pub rate_limit_config: Arc<RateLimitConfig>,
}

pub fn router(state: TokensState) -> Router {
    let login_router = Router::new()
        .route("/auth", post(login))
        .route("/web/auth", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit_config.clone(),
            rate_limit_login,
        ));

    let refresh_router = Router::new()
        .route("/refresh-token", post(refresh_token))
        .route("/web/refresh", get(refresh_from_cookie))
        .route("/web/logout", get(logout))
        .with_state(state);

    Router::new().merge(login_router).merge(refresh_router)
}

#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct RefreshForm {
    #[serde(default)]
    refresh_token: String,
}

/// Check credentials and issue a token pair.
/// The body is parsed by hand so any non-JSON input is a 400.
async fn login(
    State(state): State<TokensState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let creds: Credentials =
        serde_json::from_slice(&body).map_err(|_| ApiError::bad_request("unauthorized"))?;

    let user = state
        .db
        .users()
        .get_by_email(&creds.email)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("unauthorized"))?;

    match user.password_matches(&creds.password) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = user.id, "Login failed: wrong password");
            return Err(ApiError::unauthorized("unauthorized"));
        }
        Err(e) => {
            warn!(user_id = user.id, error = %e, "Login failed: stored hash unusable");
            return Err(ApiError::unauthorized("unauthorized"));
        }
    }

    let pair = state.jwt.issue(&user.principal()).map_err(|e| {
        error!(user_id = user.id, error = %e, "Failed to issue token pair");
        ApiError::internal("error generating token pair")
    })?;

    let cookie = state.refresher.cookies().cookie_for(&pair);
    info!(user_id = user.id, "User logged in");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie.header_value())],
        Json(pair),
    ))
}

/// Rotate a refresh token submitted as the `refresh_token` form field.
async fn refresh_token(
    State(state): State<TokensState>,
    form: Result<Form<RefreshForm>, FormRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Form(form) = form.map_err(|_| ApiError::bad_request("invalid form"))?;

    let pair = state.refresher.refresh(&form.refresh_token).await?;
    let cookie = state.refresher.cookies().cookie_for(&pair);

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie.header_value())],
        Json(pair),
    ))
}

/// Rotate the refresh token carried in the refresh cookie.
async fn refresh_from_cookie(
    State(state): State<TokensState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let value = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .ok_or_else(|| ApiError::unauthorized("no refresh cookie"))?;

    let (pair, cookie) = state.refresher.refresh_from_cookie(value).await?;

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie.header_value())],
        Json(pair),
    ))
}

/// Logout: overwrite the refresh cookie with an expired, empty one.
/// Refresh tokens already handed out stay valid until they expire.
async fn logout(State(state): State<TokensState>) -> impl IntoResponse {
    let cookie = state.refresher.cookies().expired_cookie();
    (StatusCode::ACCEPTED, [(SET_COOKIE, cookie.header_value())])
}
