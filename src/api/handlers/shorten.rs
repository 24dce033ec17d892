//! Handler for `?shorten=` requests.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::dto::parse_shorten_param;
use crate::domain::hooks::{HookContext, HookEvent};
use crate::domain::request::RequestContext;
use crate::error::AppError;
use crate::state::AppState;

/// Shortens one URL or a JSON array of URLs.
///
/// # Query Parameters
///
/// - `shorten` - `example.com` or `["a.com","b.com"]`
///
/// # Response
///
/// `200 application/json` mapping every normalized long URL to its short URL:
///
/// ```json
/// { "http://a.com": "http://sho.rt/AQ", "http://b.com": "http://sho.rt/Ag" }
/// ```
///
/// # Errors
///
/// Returns an operational error (500) if the parameter cannot be parsed or the
/// backend fails. Nothing is returned until every URL is resolved.
pub async fn handle_shorten(
    state: &AppState,
    ctx: &RequestContext,
    payload: &str,
) -> Result<Response, AppError> {
    let urls = parse_shorten_param(payload)?;
    debug!(count = urls.len(), "URLs to shorten");

    let shortened = state.shortener.shorten(ctx.host.as_deref(), &urls).await?;

    let hook_ctx = HookContext::new(ctx).with_shortened(&shortened);
    state
        .hooks
        .fire(HookEvent::BeforeShortenResponse, &hook_ctx)?;

    let response = Json(&shortened).into_response();

    state
        .hooks
        .fire(HookEvent::AfterShortenResponse, &hook_ctx)?;

    Ok(response)
}
