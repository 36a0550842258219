//! Client identification utilities
//!
//! Common functions for reading client-supplied headers.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Error when reading a required header
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("Missing required header: {0}")]
    Missing(&'static str),
    #[error("Header {0} is not valid UTF-8")]
    NotUtf8(&'static str),
}

/// Read a header as a trimmed, non-empty string
pub fn required_header<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
) -> Result<&'a str, HeaderError> {
    let value = headers.get(name).ok_or(HeaderError::Missing(name))?;
    let value = value.to_str().map_err(|_| HeaderError::NotUtf8(name))?.trim();
    if value.is_empty() {
        return Err(HeaderError::Missing(name));
    }
    Ok(value)
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}

/// Key used to bucket per-client counters; falls back to a shared bucket
///
/// `X-Forwarded-For` is client-controlled unless a reverse proxy rewrites it,
/// so it is only read when `trust_forwarded` is set.
pub fn client_key(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_forwarded: bool,
) -> String {
    let ip = if trust_forwarded {
        extract_client_ip(headers, direct_ip)
    } else {
        direct_ip
    };
    ip.map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
