//! Refresh cookie construction and cookie header parsing.

use axum::http::header;
use std::time::{Duration, SystemTime};
use time::OffsetDateTime;
use time::macros::{datetime, format_description};

use crate::jwt::TokenPair;

/// Cookie name for the refresh token. The `__Host-` prefix keeps it bound to
/// the exact host that set it.
pub const REFRESH_COOKIE_NAME: &str = "__Host-refresh_token";

/// A `Set-Cookie` value binding the refresh token to the browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCookie {
    pub value: String,
    pub domain: String,
    pub expires: OffsetDateTime,
    pub max_age: i64,
}

impl RefreshCookie {
    /// Render as a `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Domain={}; Max-Age={}",
            REFRESH_COOKIE_NAME, self.value, self.domain, self.max_age
        );
        if let Some(date) = http_date(self.expires) {
            cookie.push_str("; Expires=");
            cookie.push_str(&date);
        }
        cookie.push_str("; HttpOnly; Secure; SameSite=Strict");
        cookie
    }
}

/// Builds refresh cookies for one cookie domain.
#[derive(Debug, Clone)]
pub struct RefreshCookieManager {
    domain: String,
    ttl: Duration,
}

impl RefreshCookieManager {
    /// `ttl` should match the refresh token lifetime.
    pub fn new(domain: impl Into<String>, ttl: Duration) -> Self {
        Self {
            domain: domain.into(),
            ttl,
        }
    }

    /// Cookie carrying `token`, expiring `ttl` from now.
    pub fn set_refresh_cookie(&self, token: &str, ttl: Duration) -> RefreshCookie {
        self.set_refresh_cookie_at(token, ttl, SystemTime::now())
    }

    pub fn set_refresh_cookie_at(&self, token: &str, ttl: Duration, now: SystemTime) -> RefreshCookie {
        RefreshCookie {
            value: token.to_string(),
            domain: self.domain.clone(),
            expires: expiry_after(now, ttl),
            max_age: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Cookie for the refresh half of `pair`, using the configured lifetime.
    pub fn cookie_for(&self, pair: &TokenPair) -> RefreshCookie {
        self.set_refresh_cookie(&pair.refresh_token, self.ttl)
    }

    /// Empty cookie dated at the Unix epoch so the client discards it.
    /// Nothing server-side is invalidated.
    pub fn clear_refresh_cookie(&self) -> RefreshCookie {
        RefreshCookie {
            value: String::new(),
            domain: self.domain.clone(),
            expires: OffsetDateTime::UNIX_EPOCH,
            max_age: 0,
        }
    }

    /// The cookie sent on logout.
    pub fn expired_cookie(&self) -> RefreshCookie {
        self.clear_refresh_cookie()
    }
}

/// Latest expiry a cookie is given; larger lifetimes are clamped to it.
const MAX_EXPIRY: OffsetDateTime = datetime!(9999-12-31 23:59:59 UTC);

fn expiry_after(now: SystemTime, ttl: Duration) -> OffsetDateTime {
    time::Duration::try_from(ttl)
        .ok()
        .and_then(|ttl| OffsetDateTime::from(now).checked_add(ttl))
        .map_or(MAX_EXPIRY, |at| at.min(MAX_EXPIRY))
}

fn http_date(at: OffsetDateTime) -> Option<String> {
    at.format(format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    ))
    .ok()
}

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}
