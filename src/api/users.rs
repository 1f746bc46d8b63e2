use axum::{
    Json, Router,
    extract::{Path, State},
    http::header::VARY,
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::BearerAuth;
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(UsersState);

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/me", get(current_user))
        .route("/{user_id}", get(get_user))
        .with_state(state)
}

/// Claims of the verified caller.
async fn current_user(BearerAuth(verified): BearerAuth) -> impl IntoResponse {
    ([(VARY, "Authorization")], Json(verified.claims))
}

async fn get_user(
    State(state): State<UsersState>,
    BearerAuth(_verified): BearerAuth,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: i64 = user_id
        .parse()
        .map_err(|_| ApiError::bad_request("invalid user id"))?;

    let user = state
        .db
        .users()
        .get_by_id(id)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(([(VARY, "Authorization")], Json(user.principal())))
}
