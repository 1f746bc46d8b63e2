//! Refresh token rotation.
//!
//! A refresh token is only exchanged once it is close to expiry. The new pair
//! is minted from the principal as currently stored, not from the old claims,
//! so name and admin changes take effect on the next rotation.

use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};

use super::cookie::{RefreshCookie, RefreshCookieManager};
use crate::jwt::{JwtConfig, TokenPair};
use crate::principal::PrincipalLookup;

/// Rotation is refused while the refresh token has more than this left.
pub const REFRESH_WINDOW: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("invalid or expired refresh token")]
    InvalidOrExpiredRefreshToken,
    #[error("refresh token does not need renewing yet")]
    TooEarlyToRefresh,
    #[error("unknown user")]
    UnknownPrincipal,
    #[error("error generating token pair")]
    IssuanceFailure,
}

/// Exchanges near-expiry refresh tokens for new pairs.
#[derive(Clone)]
pub struct Refresher<L> {
    jwt: Arc<JwtConfig>,
    principals: L,
    cookies: RefreshCookieManager,
    window: Duration,
}

impl<L: PrincipalLookup> Refresher<L> {
    pub fn new(jwt: Arc<JwtConfig>, principals: L, cookies: RefreshCookieManager) -> Self {
        Self {
            jwt,
            principals,
            cookies,
            window: REFRESH_WINDOW,
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn cookies(&self) -> &RefreshCookieManager {
        &self.cookies
    }

    /// Rotate using a refresh token submitted directly (e.g. a form field).
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        self.refresh_at(refresh_token, SystemTime::now()).await
    }

    /// Rotate using the refresh cookie; also returns the replacement cookie.
    pub async fn refresh_from_cookie(
        &self,
        cookie_value: &str,
    ) -> Result<(TokenPair, RefreshCookie), RefreshError> {
        let pair = self.refresh(cookie_value).await?;
        let cookie = self.cookies.cookie_for(&pair);
        Ok((pair, cookie))
    }

    pub async fn refresh_at(
        &self,
        refresh_token: &str,
        now: SystemTime,
    ) -> Result<TokenPair, RefreshError> {
        let claims = self
            .jwt
            .validate_refresh_token_at(refresh_token, now)
            .map_err(|e| {
                info!(reason = %e, "Refresh token rejected");
                RefreshError::InvalidOrExpiredRefreshToken
            })?;

        if claims.remaining_lifetime(now) > self.window {
            return Err(RefreshError::TooEarlyToRefresh);
        }

        let id = claims
            .principal_id()
            .ok_or(RefreshError::InvalidOrExpiredRefreshToken)?;

        let principal = match self.principals.principal_by_id(id).await {
            Ok(Some(principal)) => principal,
            Ok(None) => {
                warn!(user_id = id, "Refresh for unknown user");
                return Err(RefreshError::UnknownPrincipal);
            }
            Err(e) => {
                error!(user_id = id, error = %e, "Failed to look up user for refresh");
                return Err(RefreshError::UnknownPrincipal);
            }
        };

        self.jwt.issue_at(&principal, now).map_err(|e| {
            error!(user_id = id, error = %e, "Failed to issue token pair");
            RefreshError::IssuanceFailure
        })
    }
}
