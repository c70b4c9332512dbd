//! Client IP extraction
//!
//! Rate limiting and audit logging key on the client IP, which makes the
//! `X-Forwarded-For` chain an attack surface: a client can prepend
//! arbitrary entries. Only the last `trusted_proxy_count` entries come
//! from infrastructure we control, so the client IP is the entry just
//! before that suffix, validated as a real address.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract the client IP from headers, falling back to the socket address
/// and then to `"unknown"`.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&std::net::SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    if let Some(forwarded_for) = headers.get("x-forwarded-for") {
        if let Ok(header_value) = forwarded_for.to_str() {
            let ip = extract_from_forwarded_for(header_value, trusted_proxy_count);
            if ip != "unknown" {
                return ip;
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(header_value) = real_ip.to_str() {
            let trimmed = header_value.trim();
            if is_valid_ip(trimmed) {
                return trimmed.to_string();
            }
        }
    }

    if let Some(addr) = socket_addr {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// `X-Forwarded-For` lists `client, proxy1, proxy2, ...`. With N trusted
/// proxies at the end of the chain, the client is the entry at position
/// `len - N - 1`.
fn extract_from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> String {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if ips.is_empty() {
        return "unknown".to_string();
    }

    // With no trusted proxies the whole header is client-controlled; the
    // last entry (closest to us) is the least spoofable one.
    let pos = if trusted_proxy_count == 0 || ips.len() <= trusted_proxy_count {
        ips.len() - 1
    } else {
        ips.len() - trusted_proxy_count - 1
    };

    match ips.get(pos) {
        Some(candidate) if is_valid_ip(candidate) => candidate.to_string(),
        _ => "unknown".to_string(),
    }
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}
