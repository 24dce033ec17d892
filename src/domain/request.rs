//! Per-request context and request classification.

use axum::http::{HeaderMap, Method, request::Parts};
use std::net::SocketAddr;

use crate::utils::request_info::{host_from_headers, request_host};

/// Query parameter that turns any request into a shorten request.
pub const SHORTEN_PARAM: &str = "shorten";

/// Path prefix reserved for files served from the template directory.
pub const TEMPLATE_PREFIX: &str = "/t/";

/// What a request asks the service to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// `?shorten=<url-or-json-array>` on any path. Holds the raw parameter value.
    Shorten { payload: String },
    /// `/<short_id>`. The identifier has not been validated yet.
    Redirect { short_id: String },
    /// `/t/<relative_path>`.
    Template { relative_path: String },
    /// `/` with an index page configured.
    Index,
    /// `/` without an index page.
    Unknown,
}

/// Decides the [`RequestKind`] from the request path and decoded query pairs.
///
/// The shorten parameter wins over the path. Otherwise the template prefix is checked
/// before the path is treated as a short identifier.
pub fn classify(path: &str, query: &[(String, String)], index_configured: bool) -> RequestKind {
    if let Some((_, payload)) = query.iter().find(|(key, _)| key == SHORTEN_PARAM) {
        return RequestKind::Shorten {
            payload: payload.clone(),
        };
    }

    if let Some(relative_path) = path.strip_prefix(TEMPLATE_PREFIX) {
        return RequestKind::Template {
            relative_path: relative_path.to_string(),
        };
    }

    let short_id = path.strip_prefix('/').unwrap_or(path);

    if !short_id.is_empty() {
        RequestKind::Redirect {
            short_id: short_id.to_string(),
        }
    } else if index_configured {
        RequestKind::Index
    } else {
        RequestKind::Unknown
    }
}

/// Everything the dispatch engine knows about one request.
///
/// Built once per request and never shared between requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub raw_query: Option<String>,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    /// Host the client addressed, used to build short URLs.
    pub host: Option<String>,
    pub peer: Option<SocketAddr>,
    pub kind: RequestKind,
}

impl RequestContext {
    /// Builds and classifies the context for an incoming request.
    pub fn new(
        method: Method,
        path: &str,
        raw_query: Option<&str>,
        headers: HeaderMap,
        peer: Option<SocketAddr>,
        index_configured: bool,
    ) -> Self {
        let query: Vec<(String, String)> = raw_query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        let kind = classify(path, &query, index_configured);
        let host = host_from_headers(&headers);

        Self {
            method,
            path: path.to_string(),
            raw_query: raw_query.map(str::to_string),
            query,
            headers,
            host,
            peer,
            kind,
        }
    }

    /// Builds the context from the request head produced by the HTTP layer.
    ///
    /// Without a `Host` header (HTTP/2) the host is taken from the URI authority.
    pub fn from_parts(parts: &Parts, peer: Option<SocketAddr>, index_configured: bool) -> Self {
        let mut ctx = Self::new(
            parts.method.clone(),
            parts.uri.path(),
            parts.uri.query(),
            parts.headers.clone(),
            peer,
            index_configured,
        );
        ctx.host = request_host(&parts.headers, &parts.uri);
        ctx
    }

    /// Path and query exactly as requested, e.g. `/AQ?utm=x`.
    pub fn requested_url(&self) -> String {
        match &self.raw_query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }

    /// First value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
