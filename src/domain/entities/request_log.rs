//! Audit record written for every successful redirect.

use axum::http::header;
use chrono::{DateTime, Utc};

use crate::domain::hooks::HookContext;
use crate::utils::request_info::{client_ip, header_string};

/// One redirect as seen by the audit log.
///
/// Captured inside the `after_short_redirect_response` hook and handed to the
/// background audit worker, so the redirect itself never waits for the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLogEntry {
    pub short_id: String,
    pub requested_url: String,
    pub redirected_url: String,
    pub user_agent: Option<String>,
    pub language: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RequestLogEntry {
    /// Builds an entry from a redirect hook context.
    ///
    /// Returns `None` when the context does not describe a redirect.
    pub fn from_hook(ctx: &HookContext<'_>) -> Option<Self> {
        let short_id = ctx.short_id?;
        let long_url = ctx.long_url?;
        let headers = &ctx.request.headers;

        Some(Self {
            short_id: short_id.to_string(),
            requested_url: ctx.request.requested_url(),
            redirected_url: long_url.to_string(),
            user_agent: header_string(headers, header::USER_AGENT),
            language: header_string(headers, header::ACCEPT_LANGUAGE),
            referer: header_string(headers, header::REFERER),
            ip: client_ip(headers, ctx.request.peer),
            created_at: Utc::now(),
        })
    }
}
