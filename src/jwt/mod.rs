//! JWT token generation and validation.
//!
//! Dual-token system: short-lived access tokens (15 minutes) carrying the
//! principal's name and admin flag, and long-lived refresh tokens (24 hours)
//! carrying only the subject. Both are HMAC-signed and fully stateless: there
//! is no server-side record of issued tokens.

mod claims;
mod issue;
mod verify;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use claims::{AccessClaims, RefreshClaims, build_access_claims, build_refresh_claims};
pub use verify::Verified;

pub(crate) use claims::unix_seconds;

/// Access token duration: 15 minutes
pub const ACCESS_TOKEN_DURATION: Duration = Duration::from_secs(15 * 60);

/// Refresh token duration: 24 hours
pub const REFRESH_TOKEN_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Algorithms accepted when verifying. Anything else is refused before the
/// signature is checked.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Lifetimes applied to newly issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: ACCESS_TOKEN_DURATION,
            refresh: REFRESH_TOKEN_DURATION,
        }
    }
}

/// Signed access/refresh pair handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    has_secret: bool,
    domain: String,
    lifetimes: TokenLifetimes,
}

impl JwtConfig {
    /// Create a configuration with the default lifetimes.
    /// `domain` is used as both issuer and audience of access tokens.
    pub fn new(secret: &[u8], domain: impl Into<String>) -> Self {
        Self::with_lifetimes(secret, domain, TokenLifetimes::default())
    }

    pub fn with_lifetimes(secret: &[u8], domain: impl Into<String>, lifetimes: TokenLifetimes) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            has_secret: !secret.is_empty(),
            domain: domain.into(),
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }
}

/// Errors that can occur while issuing a token pair.
#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("signing secret is not configured")]
    MissingSecret,
    #[error("principal ID must be non-zero")]
    InvalidPrincipal,
    #[error("failed to encode token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

/// Reasons a bearer or refresh token is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("no authorization header")]
    NoAuthHeader,
    #[error("invalid authorization header")]
    MalformedHeader,
    #[error("invalid token")]
    InvalidSignature,
    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,
    #[error("expired token")]
    Expired,
    #[error("incorrect issuer")]
    WrongIssuer,
    #[error("incorrect audience")]
    WrongAudience,
    #[error("wrong kind of token")]
    WrongTokenType,
}
