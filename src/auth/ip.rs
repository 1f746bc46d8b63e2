//! Client IP extraction utilities.

use std::net::SocketAddr;

use axum::{extract::ConnectInfo, http::request::Parts};

/// Trait for types that provide access to HTTP headers and extensions.
/// Implemented for both `Parts` and `Request` to allow flexible IP extraction.
pub trait HasHeadersAndExtensions {
    fn headers(&self) -> &axum::http::HeaderMap;
    fn extensions(&self) -> &axum::http::Extensions;
}

impl HasHeadersAndExtensions for Parts {
    fn headers(&self) -> &axum::http::HeaderMap {
        &self.headers
    }
    fn extensions(&self) -> &axum::http::Extensions {
        &self.extensions
    }
}

impl<B> HasHeadersAndExtensions for axum::extract::Request<B> {
    fn headers(&self) -> &axum::http::HeaderMap {
        axum::extract::Request::headers(self)
    }
    fn extensions(&self) -> &axum::http::Extensions {
        axum::extract::Request::extensions(self)
    }
}

/// Client IP address from the connection, or from the first
/// `X-Forwarded-For` entry when the connection address is not available.
pub fn extract_client_ip<T: HasHeadersAndExtensions>(source: &T) -> Result<String, &'static str> {
    if let Some(ConnectInfo(addr)) = source.extensions().get::<ConnectInfo<SocketAddr>>() {
        return Ok(addr.ip().to_string());
    }

    let forwarded = source
        .headers()
        .get("x-forwarded-for")
        .ok_or("No client IP available")?
        .to_str()
        .map_err(|_| "IP header contains invalid characters")?;

    forwarded
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .ok_or("IP header is empty")
}
