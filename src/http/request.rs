//! Request identity helpers.
//!
//! # Responsibilities
//! - Derive the caller key used by the attempt tracker
//! - Name the request ID header shared by the trace layers

use std::net::{IpAddr, SocketAddr};

use axum::http::{header, HeaderMap, HeaderName};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Caller key for a peer address: its IP, without the port.
///
/// IPv4-mapped IPv6 peers (`::ffff:a.b.c.d`) share a key with the plain IPv4
/// address so a dual-stack listener cannot be used to split a streak.
pub fn client_key(peer: &SocketAddr) -> String {
    let ip = match peer.ip() {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(IpAddr::V6(v6), IpAddr::V4),
        v4 => v4,
    };
    ip.to_string()
}

/// User-Agent header for log lines, empty when absent or not UTF-8.
pub fn user_agent(headers: &HeaderMap) -> &str {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
