//! Claim sets carried by access and refresh tokens.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::principal::Principal;

/// JWT claims for access tokens.
///
/// Field order is the serialization order, so the signed payload is stable
/// for a given principal and instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (principal ID as a string)
    pub sub: String,
    /// Display name ("first last")
    pub name: String,
    pub admin: bool,
    pub iss: String,
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// JWT claims for refresh tokens. Only what is needed to find the principal again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub exp: u64,
}

impl AccessClaims {
    /// Principal ID encoded in `sub`, if it is a positive integer.
    pub fn principal_id(&self) -> Option<i64> {
        parse_subject(&self.sub)
    }
}

impl RefreshClaims {
    /// Principal ID encoded in `sub`, if it is a positive integer.
    pub fn principal_id(&self) -> Option<i64> {
        parse_subject(&self.sub)
    }

    /// Time left before this token expires, zero if it already has.
    pub fn remaining_lifetime(&self, now: SystemTime) -> Duration {
        Duration::from_secs(self.exp.saturating_sub(unix_seconds(now)))
    }
}

/// Build the access claim set for `principal`, expiring `ttl` after `now`.
pub fn build_access_claims(
    principal: &Principal,
    issuer: &str,
    audience: &str,
    ttl: Duration,
    now: SystemTime,
) -> AccessClaims {
    AccessClaims {
        sub: principal.id.to_string(),
        name: principal.display_name(),
        admin: principal.is_admin,
        iss: issuer.to_string(),
        aud: audience.to_string(),
        exp: expires_at(now, ttl),
    }
}

/// Build the refresh claim set for `principal`, expiring `ttl` after `now`.
pub fn build_refresh_claims(principal: &Principal, ttl: Duration, now: SystemTime) -> RefreshClaims {
    RefreshClaims {
        sub: principal.id.to_string(),
        exp: expires_at(now, ttl),
    }
}

/// Seconds since the Unix epoch; instants before the epoch clamp to zero.
pub(crate) fn unix_seconds(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn expires_at(now: SystemTime, ttl: Duration) -> u64 {
    unix_seconds(now).saturating_add(ttl.as_secs())
}

fn parse_subject(sub: &str) -> Option<i64> {
    sub.parse::<i64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_user() -> Principal {
        Principal {
            id: 1,
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            is_admin: true,
        }
    }

    #[test]
    fn test_access_claims_from_principal() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        let claims = build_access_claims(
            &admin_user(),
            "example.com",
            "example.com",
            Duration::from_secs(900),
            now,
        );

        assert_eq!(claims.sub, "1");
        assert_eq!(claims.name, "Admin User");
        assert!(claims.admin);
        assert_eq!(claims.iss, "example.com");
        assert_eq!(claims.aud, "example.com");
        assert_eq!(claims.exp, 1_900);
    }

    #[test]
    fn test_refresh_claims_carry_only_subject_and_expiry() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        let claims = build_refresh_claims(&admin_user(), Duration::from_secs(86_400), now);

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json, serde_json::json!({ "sub": "1", "exp": 87_400 }));
    }

    #[test]
    fn test_serialization_order_is_stable() {
        let now = UNIX_EPOCH + Duration::from_secs(10);
        let claims = build_access_claims(&admin_user(), "a", "b", Duration::from_secs(5), now);

        assert_eq!(
            serde_json::to_string(&claims).unwrap(),
            r#"{"sub":"1","name":"Admin User","admin":true,"iss":"a","aud":"b","exp":15}"#
        );
    }

    #[test]
    fn test_principal_id_rejects_non_numeric_and_zero() {
        let mut claims = RefreshClaims {
            sub: "42".to_string(),
            exp: 0,
        };
        assert_eq!(claims.principal_id(), Some(42));

        claims.sub = "abc".to_string();
        assert_eq!(claims.principal_id(), None);

        claims.sub = "0".to_string();
        assert_eq!(claims.principal_id(), None);
    }

    #[test]
    fn test_remaining_lifetime_saturates() {
        let claims = RefreshClaims {
            sub: "1".to_string(),
            exp: 100,
        };

        let before = UNIX_EPOCH + Duration::from_secs(70);
        assert_eq!(claims.remaining_lifetime(before), Duration::from_secs(30));

        let after = UNIX_EPOCH + Duration::from_secs(500);
        assert_eq!(claims.remaining_lifetime(after), Duration::ZERO);
    }
}
