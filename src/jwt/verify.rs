use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};
use serde::Deserialize;
use std::time::SystemTime;

use super::{AccessClaims, HMAC_ALGORITHMS, JwtConfig, RefreshClaims, VerifyError, unix_seconds};

/// A bearer token that passed every check, with its parsed claims.
#[derive(Debug, Clone)]
pub struct Verified {
    pub token: String,
    pub claims: AccessClaims,
}

/// Shape a refresh token is decoded into. Access tokens also decode into it,
/// so the presence of `aud` or `iss` marks the wrong kind of token.
#[derive(Deserialize)]
struct RefreshEnvelope {
    sub: String,
    exp: u64,
    aud: Option<serde_json::Value>,
    iss: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct JoseHeader {
    alg: String,
}

impl JwtConfig {
    /// Validate an `Authorization` header value of the form `Bearer <token>`.
    pub fn verify_bearer(&self, header: Option<&str>) -> Result<Verified, VerifyError> {
        let header = match header {
            Some(value) if !value.is_empty() => value,
            _ => return Err(VerifyError::NoAuthHeader),
        };

        let parts: Vec<&str> = header.split(' ').collect();
        if parts.len() != 2 || parts[0] != "Bearer" {
            return Err(VerifyError::MalformedHeader);
        }
        let token = parts[1];

        let claims = self.verify_access_token(token)?;
        Ok(Verified {
            token: token.to_string(),
            claims,
        })
    }

    /// Validate and decode an access token.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, VerifyError> {
        ensure_hmac_header(token)?;

        let claims = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation())
            .map_err(map_decode_error)?
            .claims;

        if claims.iss != self.domain {
            return Err(VerifyError::WrongIssuer);
        }
        if claims.aud != self.domain {
            return Err(VerifyError::WrongAudience);
        }

        Ok(claims)
    }

    /// Validate and decode a refresh token. Refresh tokens carry no issuer,
    /// so only the signature, algorithm and expiry are checked.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, VerifyError> {
        self.validate_refresh_token_at(token, SystemTime::now())
    }

    /// Same as `validate_refresh_token`, with expiry judged at `now`.
    pub fn validate_refresh_token_at(
        &self,
        token: &str,
        now: SystemTime,
    ) -> Result<RefreshClaims, VerifyError> {
        ensure_hmac_header(token)?;

        let mut validation = validation();
        validation.validate_exp = false;

        let envelope = jsonwebtoken::decode::<RefreshEnvelope>(token, &self.decoding_key, &validation)
            .map_err(map_decode_error)?
            .claims;

        if envelope.aud.is_some() || envelope.iss.is_some() {
            return Err(VerifyError::WrongTokenType);
        }
        if envelope.exp < unix_seconds(now) {
            return Err(VerifyError::Expired);
        }

        Ok(RefreshClaims {
            sub: envelope.sub,
            exp: envelope.exp,
        })
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = HMAC_ALGORITHMS.to_vec();
    validation.leeway = 0;
    // Audience is compared against the configured domain after decoding.
    validation.validate_aud = false;
    validation
}

/// Reject tokens whose header names anything but an HMAC algorithm, including
/// `none`, without trusting the library to parse an unknown `alg`.
fn ensure_hmac_header(token: &str) -> Result<(), VerifyError> {
    let encoded = token.split('.').next().ok_or(VerifyError::InvalidSignature)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| VerifyError::InvalidSignature)?;
    let header: JoseHeader =
        serde_json::from_slice(&bytes).map_err(|_| VerifyError::InvalidSignature)?;

    match header.alg.as_str() {
        "HS256" | "HS384" | "HS512" => Ok(()),
        _ => Err(VerifyError::UnexpectedAlgorithm),
    }
}

fn map_decode_error(e: jsonwebtoken::errors::Error) -> VerifyError {
    match e.kind() {
        ErrorKind::ExpiredSignature => VerifyError::Expired,
        ErrorKind::InvalidAlgorithm => VerifyError::UnexpectedAlgorithm,
        _ => VerifyError::InvalidSignature,
    }
}
