//! Bearer authentication, refresh cookies and refresh token rotation.

mod cookie;
mod errors;
mod extractors;
mod ip;
mod refresh;
mod state;

pub use cookie::{REFRESH_COOKIE_NAME, RefreshCookie, RefreshCookieManager, get_cookie};
pub use errors::ApiAuthError;
pub use extractors::BearerAuth;
pub use ip::{HasHeadersAndExtensions, extract_client_ip};
pub use refresh::{REFRESH_WINDOW, RefreshError, Refresher};
pub use state::HasAuthBackend;
