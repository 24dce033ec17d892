//! Request metadata extraction from HTTP headers.

use axum::http::{HeaderMap, Uri, header};
use std::net::SocketAddr;

/// Returns the `Host` header as sent by the client, port included.
///
/// Used to build short URLs that point back at the address the client used.
/// Returns `None` when the header is missing, blank or not valid UTF-8.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::HOST, "s.example.com:8080".parse().unwrap());
///
/// assert_eq!(host_from_headers(&headers).as_deref(), Some("s.example.com:8080"));
/// ```
pub fn host_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
}

/// Returns the host the client addressed: the `Host` header, else the URI authority.
///
/// HTTP/2 requests carry the host in the `:authority` pseudo-header, which ends up in
/// the URI rather than in the header map.
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    if let Some(host) = host_from_headers(headers) {
        return Some(host);
    }
    uri.authority().map(ToString::to_string)
}

/// Returns a header value as an owned string, if present and valid UTF-8.
pub fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Determines the client IP address.
///
/// Prefers the first entry of `X-Forwarded-For` (the originating client when the
/// service sits behind a proxy) and falls back to the peer socket address.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    match forwarded {
        Some(ip) => Some(ip.to_string()),
        None => peer.map(|addr| addr.ip().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};

    #[test]
    fn test_host_simple() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));

        assert_eq!(host_from_headers(&headers).as_deref(), Some("example.com"));
    }

    #[test]
    fn test_host_keeps_port() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:8080"));

        assert_eq!(
            host_from_headers(&headers).as_deref(),
            Some("localhost:8080")
        );
    }

    #[test]
    fn test_host_ipv6_with_port() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("[::1]:8080"));

        assert_eq!(host_from_headers(&headers).as_deref(), Some("[::1]:8080"));
    }

    #[test]
    fn test_host_missing() {
        let headers = HeaderMap::new();
        assert!(host_from_headers(&headers).is_none());
    }

    #[test]
    fn test_host_blank() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("  "));
        assert!(host_from_headers(&headers).is_none());
    }

    #[test]
    fn test_host_invalid_utf8() {
        let mut headers = HeaderMap::new();
        let invalid_bytes = vec![0xFF, 0xFE, 0xFD];
        if let Ok(header_value) = HeaderValue::from_bytes(&invalid_bytes) {
            headers.insert(header::HOST, header_value);
            assert!(host_from_headers(&headers).is_none());
        }
    }

    #[test]
    fn test_request_host_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("sho.rt"));
        let uri: Uri = "http://other.example:8443/AQ".parse().unwrap();

        assert_eq!(request_host(&headers, &uri).as_deref(), Some("sho.rt"));
    }

    #[test]
    fn test_request_host_falls_back_to_authority() {
        let uri: Uri = "https://sho.rt:8443/?shorten=a.com".parse().unwrap();

        assert_eq!(
            request_host(&HeaderMap::new(), &uri).as_deref(),
            Some("sho.rt:8443")
        );
    }

    #[test]
    fn test_request_host_origin_form_without_header() {
        let uri: Uri = "/AQ".parse().unwrap();
        assert!(request_host(&HeaderMap::new(), &uri).is_none());
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        assert_eq!(
            client_ip(&headers, Some(peer)).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "192.168.1.10:5000".parse().unwrap();

        assert_eq!(
            client_ip(&headers, Some(peer)).as_deref(),
            Some("192.168.1.10")
        );
    }

    #[test]
    fn test_client_ip_unknown() {
        let headers = HeaderMap::new();
        assert!(client_ip(&headers, None).is_none());
    }
}
