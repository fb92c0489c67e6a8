use std::net::IpAddr;
use std::net::SocketAddr;

use axum::http::HeaderMap;

pub mod handlers;
pub mod middleware;
pub mod router;

/// Resolve the caller's network address for rate-limit keying.
///
/// Prefers the first entry of `X-Forwarded-For` when a proxy supplied one,
/// falling back to the socket peer address.
pub(crate) fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or_else(|| peer.ip())
}
