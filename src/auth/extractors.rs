//! Axum extractors for bearer authentication.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use super::errors::ApiAuthError;
use super::state::HasAuthBackend;
use crate::jwt::{Verified, VerifyError};

fn verify_request<S: HasAuthBackend>(parts: &Parts, state: &S) -> Result<Verified, ApiAuthError> {
    let reject = |e: VerifyError| {
        tracing::debug!(reason = %e, "Bearer token rejected");
        ApiAuthError::from(e)
    };

    let header = match parts.headers.get(header::AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| reject(VerifyError::MalformedHeader))?,
        ),
        None => None,
    };

    state.jwt().verify_bearer(header).map_err(reject)
}

/// Extractor for endpoints that require a valid access token in the
/// `Authorization: Bearer` header.
pub struct BearerAuth(pub Verified);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        verify_request(parts, state).map(BearerAuth)
    }
}
