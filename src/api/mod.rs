mod error;
mod tokens;
mod users;

use axum::{Json, Router, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::Refresher;
use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::rate_limit::RateLimitConfig;

pub use error::ApiError;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    refresher: Refresher<Database>,
    rate_limit_config: Arc<RateLimitConfig>,
) -> Router {
    let tokens_state = tokens::TokensState {
        db: db.clone(),
        jwt: jwt.clone(),
        refresher,
        rate_limit_config,
    };

    let users_state = users::UsersState { db, jwt };

    Router::new()
        .route("/test", get(ping))
        .merge(tokens::router(tokens_state))
        .nest("/users", users::router(users_state))
}

#[derive(Serialize)]
struct PingResponse {
    message: &'static str,
}

async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "Hello World!",
    })
}
