//! Handler for short URL redirects.

use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::domain::hooks::{HookContext, HookEvent};
use crate::domain::request::RequestContext;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short identifier to its long URL.
///
/// # Request Flow
///
/// 1. Reject identifiers outside the short-id alphabet (404, backend untouched)
/// 2. Look the identifier up in the backend (404 on a miss)
/// 3. Fire `before_short_redirect_response`
/// 4. Answer `301` or `302` with `Location`
/// 5. Fire `after_short_redirect_response`
pub async fn handle_redirect(
    state: &AppState,
    ctx: &RequestContext,
    short_id: &str,
) -> Result<Response, AppError> {
    let long_url = state.shortener.resolve(short_id).await?;

    let hook_ctx = HookContext::new(ctx).with_redirect(short_id, &long_url);
    state
        .hooks
        .fire(HookEvent::BeforeShortRedirectResponse, &hook_ctx)?;

    let location = HeaderValue::try_from(long_url.as_str()).map_err(|e| {
        AppError::operational(
            "Stored URL cannot be used as a redirect target",
            json!({ "short_id": short_id, "reason": e.to_string() }),
        )
    })?;
    let status = state.shortener.redirect_status();
    let response = (status, [(header::LOCATION, location)]).into_response();

    state
        .hooks
        .fire(HookEvent::AfterShortRedirectResponse, &hook_ctx)?;

    debug!(%short_id, %long_url, status = status.as_u16(), "Redirecting");
    Ok(response)
}
