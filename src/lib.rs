pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod principal;
pub mod rate_limit;

use api::create_api_router;
use auth::{RefreshCookieManager, Refresher};
use axum::Router;
use db::Database;
use jwt::{JwtConfig, TokenLifetimes};
use rate_limit::RateLimitConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Issuer and audience of every access token
    pub domain: String,
    /// Domain attribute of the refresh cookie
    pub cookie_domain: String,
    /// HMAC secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Access and refresh token lifetimes
    pub lifetimes: TokenLifetimes,
    /// Remaining lifetime at which a refresh token may be rotated
    pub refresh_window: Duration,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::with_lifetimes(
        &config.jwt_secret,
        config.domain.clone(),
        config.lifetimes,
    ));

    let cookies = RefreshCookieManager::new(config.cookie_domain.clone(), jwt.lifetimes().refresh);
    let refresher = Refresher::new(jwt.clone(), config.db.clone(), cookies)
        .with_window(config.refresh_window);

    create_api_router(
        config.db.clone(),
        jwt,
        refresher,
        Arc::new(RateLimitConfig::new()),
    )
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
