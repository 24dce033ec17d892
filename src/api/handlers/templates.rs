//! Handlers for template files and the index page.

use axum::response::{Html, IntoResponse, Response};

use crate::domain::hooks::{HookContext, HookEvent};
use crate::domain::request::RequestContext;
use crate::error::AppError;
use crate::state::AppState;

/// Serves `/t/<relative_path>` from the template directory as `text/html`.
pub async fn handle_template(
    state: &AppState,
    ctx: &RequestContext,
    relative_path: &str,
) -> Result<Response, AppError> {
    let body = state.templates.read_template(relative_path).await?;
    respond_html(
        state,
        ctx,
        body,
        HookEvent::BeforeTemplateResponse,
        HookEvent::AfterTemplateResponse,
    )
}

/// Serves the configured index page for `/`.
pub async fn handle_index(state: &AppState, ctx: &RequestContext) -> Result<Response, AppError> {
    let body = state.templates.read_index().await?;
    respond_html(
        state,
        ctx,
        body,
        HookEvent::BeforeIndexResponse,
        HookEvent::AfterIndexResponse,
    )
}

fn respond_html(
    state: &AppState,
    ctx: &RequestContext,
    body: String,
    before: HookEvent,
    after: HookEvent,
) -> Result<Response, AppError> {
    let hook_ctx = HookContext::new(ctx);
    state.hooks.fire(before, &hook_ctx)?;
    let response = Html(body).into_response();
    state.hooks.fire(after, &hook_ctx)?;
    Ok(response)
}
