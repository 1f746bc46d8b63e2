//! The identity a token pair is issued for, and the lookup used to re-read it.

use std::future::Future;

use serde::Serialize;

/// Minimal identity projected from the user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

impl Principal {
    /// Name carried in the `name` claim of access tokens.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Error raised by a principal store when it cannot answer a lookup.
#[derive(Debug, thiserror::Error)]
#[error("principal lookup failed: {0}")]
pub struct LookupError(pub String);

/// Source of truth for principals, consulted when a refresh token is rotated.
///
/// `Ok(None)` means the principal does not exist.
pub trait PrincipalLookup: Send + Sync {
    fn principal_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Principal>, LookupError>> + Send;
}
