//! Single entry point for every request.
//!
//! # Request Flow
//!
//! 1. Build a [`RequestContext`] and classify it
//! 2. Shorten requests go straight to the shorten handler
//! 3. Everything else is bracketed by `before/after_regular_request` and routed to
//!    the redirect, template or index handler. `after_regular_request` also fires
//!    when the request ends in an error, after the error hooks
//! 4. Errors are translated here, once:
//!    - `NotFound` - 404, bracketed by `before/after_404_response`
//!    - `Operational` - 500, bracketed by `before/after_500_response`
//!    - `Fatal` - 500 as above, then the server is asked to shut down

use axum::{
    extract::{ConnectInfo, Request, State},
    response::Response,
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::{debug, error, warn};

use super::{redirect, shorten, templates};
use crate::domain::hooks::{HookContext, HookEvent};
use crate::domain::request::{RequestContext, RequestKind};
use crate::error::{AppError, ErrorKind};
use crate::state::AppState;

/// Router fallback handling every method and path.
pub async fn dispatch_handler(State(state): State<AppState>, request: Request) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let (parts, _body) = request.into_parts();

    let ctx = RequestContext::from_parts(&parts, peer, state.templates.has_index());
    debug!(method = %ctx.method, path = %ctx.path, kind = ?ctx.kind, "Request classified");

    route(&state, &ctx).await
}

async fn route(state: &AppState, ctx: &RequestContext) -> Response {
    if let RequestKind::Shorten { payload } = &ctx.kind {
        return match shorten::handle_shorten(state, ctx, payload).await {
            Ok(response) => response,
            Err(e) => error_response(state, ctx, e),
        };
    }

    let hook_ctx = HookContext::new(ctx);
    let response = match route_regular(state, ctx, &hook_ctx).await {
        Ok(response) => response,
        Err(e) => {
            let response = error_response(state, ctx, e);
            fire_on_error_path(state, HookEvent::AfterRegularRequest, &hook_ctx);
            return response;
        }
    };

    let hooks = &state.hooks;
    match hooks.fire(HookEvent::AfterRegularRequest, &hook_ctx) {
        Ok(()) => response,
        Err(e) => error_response(state, ctx, e),
    }
}

async fn route_regular(
    state: &AppState,
    ctx: &RequestContext,
    hook_ctx: &HookContext<'_>,
) -> Result<Response, AppError> {
    let hooks = &state.hooks;
    hooks.fire(HookEvent::BeforeRegularRequest, hook_ctx)?;

    match &ctx.kind {
        RequestKind::Redirect { short_id } => redirect::handle_redirect(state, ctx, short_id).await,
        RequestKind::Template { relative_path } => {
            templates::handle_template(state, ctx, relative_path).await
        }
        RequestKind::Index => templates::handle_index(state, ctx).await,
        RequestKind::Unknown | RequestKind::Shorten { .. } => {
            Err(AppError::not_found("Page not found", json!({ "path": ctx.path })))
        }
    }
}

fn error_response(state: &AppState, ctx: &RequestContext, err: AppError) -> Response {
    let (before, after) = match err.kind() {
        ErrorKind::NotFound => {
            warn!(
                path = %ctx.path,
                error = %err,
                details = %err.details(),
                "Sending 404"
            );
            (HookEvent::Before404Response, HookEvent::After404Response)
        }
        ErrorKind::Operational => {
            error!(
                path = %ctx.path,
                error = %err,
                details = %err.details(),
                "Sending 500"
            );
            (HookEvent::Before500Response, HookEvent::After500Response)
        }
        ErrorKind::Fatal => {
            error!(
                severity = "critical",
                path = %ctx.path,
                error = %err,
                details = %err.details(),
                "Fatal error handling request, server going down"
            );
            state.fatal.trigger();
            (HookEvent::Before500Response, HookEvent::After500Response)
        }
    };

    let hook_ctx = HookContext::new(ctx).with_error(&err);
    fire_on_error_path(state, before, &hook_ctx);
    let response = err.to_response();
    fire_on_error_path(state, after, &hook_ctx);

    response
}

/// Error responses are already final; a failing hook is only logged.
fn fire_on_error_path(state: &AppState, event: HookEvent, hook_ctx: &HookContext<'_>) {
    if let Err(e) = state.hooks.fire(event, hook_ctx) {
        error!(event = %event, error = %e, "Hook failed while sending error response");
    }
}
