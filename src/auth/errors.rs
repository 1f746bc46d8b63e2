//! Authentication error types.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::jwt::VerifyError;

/// Rejection returned by the bearer extractors.
#[derive(Debug)]
pub enum ApiAuthError {
    Verify(VerifyError),
}

impl From<VerifyError> for ApiAuthError {
    fn from(e: VerifyError) -> Self {
        Self::Verify(e)
    }
}

impl ApiAuthError {
    fn message(&self) -> &'static str {
        match self {
            Self::Verify(VerifyError::NoAuthHeader) => "no auth header",
            Self::Verify(VerifyError::MalformedHeader) => "invalid auth header",
            Self::Verify(VerifyError::Expired) => "expired token",
            Self::Verify(VerifyError::WrongIssuer) => "incorrect issuer",
            Self::Verify(
                VerifyError::InvalidSignature
                | VerifyError::UnexpectedAlgorithm
                | VerifyError::WrongAudience
                | VerifyError::WrongTokenType,
            ) => "invalid token",
        }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        (
            StatusCode::UNAUTHORIZED,
            [(header::VARY, "Authorization")],
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
