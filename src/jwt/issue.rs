use jsonwebtoken::{Algorithm, Header};
use std::time::SystemTime;

use super::{IssueError, JwtConfig, TokenPair, build_access_claims, build_refresh_claims};
use crate::principal::Principal;

impl JwtConfig {
    /// Issue a fresh access/refresh pair for `principal`.
    pub fn issue(&self, principal: &Principal) -> Result<TokenPair, IssueError> {
        self.issue_at(principal, SystemTime::now())
    }

    /// Issue a pair whose expiries are measured from `now`.
    pub fn issue_at(&self, principal: &Principal, now: SystemTime) -> Result<TokenPair, IssueError> {
        if !self.has_secret {
            return Err(IssueError::MissingSecret);
        }
        if principal.id == 0 {
            return Err(IssueError::InvalidPrincipal);
        }

        let header = Header::new(Algorithm::HS256);

        let access_claims = build_access_claims(
            principal,
            &self.domain,
            &self.domain,
            self.lifetimes.access,
            now,
        );
        let access_token = jsonwebtoken::encode(&header, &access_claims, &self.encoding_key)
            .map_err(IssueError::Encoding)?;

        let refresh_claims = build_refresh_claims(principal, self.lifetimes.refresh, now);
        let refresh_token = jsonwebtoken::encode(&header, &refresh_claims, &self.encoding_key)
            .map_err(IssueError::Encoding)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{ACCESS_TOKEN_DURATION, unix_seconds};
    use std::time::Duration;

    fn admin_user() -> Principal {
        Principal {
            id: 1,
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            is_admin: false,
        }
    }

    #[test]
    fn test_issue_produces_verifiable_pair() {
        let config = JwtConfig::new(b"s3cret", "example.com");
        let pair = config.issue(&admin_user()).unwrap();

        let verified = config
            .verify_bearer(Some(&format!("Bearer {}", pair.access_token)))
            .unwrap();
        assert_eq!(verified.claims.sub, "1");
        assert_eq!(verified.token, pair.access_token);

        let refresh = config.validate_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, "1");
    }

    #[test]
    fn test_access_claims_match_principal() {
        let config = JwtConfig::new(b"s3cret", "example.com");
        let now = SystemTime::now();
        let pair = config.issue_at(&admin_user(), now).unwrap();

        let claims = config.verify_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "1");
        assert_eq!(claims.name, "Admin User");
        assert!(!claims.admin);
        assert_eq!(claims.iss, "example.com");
        assert_eq!(claims.aud, "example.com");
        assert_eq!(claims.exp, unix_seconds(now) + ACCESS_TOKEN_DURATION.as_secs());
    }

    #[test]
    fn test_different_instants_give_different_tokens() {
        let config = JwtConfig::new(b"s3cret", "example.com");
        let now = SystemTime::now();

        let first = config.issue_at(&admin_user(), now).unwrap();
        let second = config
            .issue_at(&admin_user(), now + Duration::from_secs(1))
            .unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
        assert!(config.verify_access_token(&first.access_token).is_ok());
        assert!(config.verify_access_token(&second.access_token).is_ok());
    }

    #[test]
    fn test_missing_secret_is_refused() {
        let config = JwtConfig::new(b"", "example.com");
        let result = config.issue(&admin_user());
        assert!(matches!(result, Err(IssueError::MissingSecret)));
    }

    #[test]
    fn test_zero_principal_is_refused() {
        let config = JwtConfig::new(b"s3cret", "example.com");
        let mut principal = admin_user();
        principal.id = 0;

        let result = config.issue(&principal);
        assert!(matches!(result, Err(IssueError::InvalidPrincipal)));
    }
}
