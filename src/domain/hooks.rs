//! Lifecycle hooks fired around every response the dispatch engine produces.
//!
//! Callbacks are collected on a mutable [`HookRegistry`] while the server is being
//! assembled (backends add theirs through
//! [`StorageBackend::register_hooks`](crate::domain::repositories::StorageBackend::register_hooks)),
//! then frozen into an immutable [`HookPipeline`] shared by all requests.
//!
//! # Firing rules
//!
//! - Callbacks for an event run in registration order, synchronously, inside the
//!   request that fired them.
//! - The first callback returning an error stops the chain; the error is handed back
//!   to the request boundary, which turns it into a 500 response.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::request::RequestContext;
use crate::error::AppError;

/// Named extension points. Each lifecycle phase has a `Before*` and an `After*` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    BeforeShortenResponse,
    AfterShortenResponse,
    BeforeShortRedirectResponse,
    AfterShortRedirectResponse,
    Before404Response,
    After404Response,
    Before500Response,
    After500Response,
    BeforeTemplateResponse,
    AfterTemplateResponse,
    BeforeIndexResponse,
    AfterIndexResponse,
    BeforeRegularRequest,
    AfterRegularRequest,
}

impl HookEvent {
    pub const ALL: [HookEvent; 14] = [
        HookEvent::BeforeShortenResponse,
        HookEvent::AfterShortenResponse,
        HookEvent::BeforeShortRedirectResponse,
        HookEvent::AfterShortRedirectResponse,
        HookEvent::Before404Response,
        HookEvent::After404Response,
        HookEvent::Before500Response,
        HookEvent::After500Response,
        HookEvent::BeforeTemplateResponse,
        HookEvent::AfterTemplateResponse,
        HookEvent::BeforeIndexResponse,
        HookEvent::AfterIndexResponse,
        HookEvent::BeforeRegularRequest,
        HookEvent::AfterRegularRequest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::BeforeShortenResponse => "before_shorten_response",
            HookEvent::AfterShortenResponse => "after_shorten_response",
            HookEvent::BeforeShortRedirectResponse => "before_short_redirect_response",
            HookEvent::AfterShortRedirectResponse => "after_short_redirect_response",
            HookEvent::Before404Response => "before_404_response",
            HookEvent::After404Response => "after_404_response",
            HookEvent::Before500Response => "before_500_response",
            HookEvent::After500Response => "after_500_response",
            HookEvent::BeforeTemplateResponse => "before_template_response",
            HookEvent::AfterTemplateResponse => "after_template_response",
            HookEvent::BeforeIndexResponse => "before_index_response",
            HookEvent::AfterIndexResponse => "after_index_response",
            HookEvent::BeforeRegularRequest => "before_regular_request",
            HookEvent::AfterRegularRequest => "after_regular_request",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown hook event: {0}")]
pub struct UnknownHookEvent(pub String);

impl FromStr for HookEvent {
    type Err = UnknownHookEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookEvent::ALL
            .iter()
            .copied()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| UnknownHookEvent(s.to_string()))
    }
}

/// Data visible to a hook callback.
///
/// Only the fields relevant to the firing phase are set: redirect events carry the
/// short id and target, shorten events the response map, error events the error.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub request: &'a RequestContext,
    pub short_id: Option<&'a str>,
    pub long_url: Option<&'a str>,
    pub shortened: Option<&'a BTreeMap<String, String>>,
    pub error: Option<&'a AppError>,
}

impl<'a> HookContext<'a> {
    pub fn new(request: &'a RequestContext) -> Self {
        Self {
            request,
            short_id: None,
            long_url: None,
            shortened: None,
            error: None,
        }
    }

    pub fn with_redirect(mut self, short_id: &'a str, long_url: &'a str) -> Self {
        self.short_id = Some(short_id);
        self.long_url = Some(long_url);
        self
    }

    pub fn with_shortened(mut self, shortened: &'a BTreeMap<String, String>) -> Self {
        self.shortened = Some(shortened);
        self
    }

    pub fn with_error(mut self, error: &'a AppError) -> Self {
        self.error = Some(error);
        self
    }
}

/// A hook callback. Receives the event it was fired for and the phase data.
pub type HookFn = dyn Fn(HookEvent, &HookContext<'_>) -> Result<(), AppError> + Send + Sync;

struct HookRegistration {
    label: String,
    callback: Arc<HookFn>,
}

/// Mutable collection of hook registrations, used only while assembling the server.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<HookEvent, Vec<HookRegistration>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback for `event`. `label` identifies it in logs.
    pub fn register<F>(&mut self, event: HookEvent, label: impl Into<String>, callback: F)
    where
        F: Fn(HookEvent, &HookContext<'_>) -> Result<(), AppError> + Send + Sync + 'static,
    {
        let label = label.into();
        debug!(event = %event, hook = %label, "Registering hook");
        self.hooks.entry(event).or_default().push(HookRegistration {
            label,
            callback: Arc::new(callback),
        });
    }

    /// Same as [`Self::register`], with the event given by name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownHookEvent`] if `event_name` is not one of the lifecycle events.
    pub fn register_named<F>(
        &mut self,
        event_name: &str,
        label: impl Into<String>,
        callback: F,
    ) -> Result<(), UnknownHookEvent>
    where
        F: Fn(HookEvent, &HookContext<'_>) -> Result<(), AppError> + Send + Sync + 'static,
    {
        let event = event_name.parse()?;
        self.register(event, label, callback);
        Ok(())
    }

    /// Freezes the registrations into a shareable pipeline.
    pub fn freeze(self) -> HookPipeline {
        HookPipeline {
            hooks: Arc::new(self.hooks),
        }
    }
}

/// Immutable, cheaply cloneable set of hooks.
#[derive(Clone, Default)]
pub struct HookPipeline {
    hooks: Arc<HashMap<HookEvent, Vec<HookRegistration>>>,
}

impl HookPipeline {
    /// A pipeline without any callbacks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of callbacks registered for `event`.
    pub fn len(&self, event: HookEvent) -> usize {
        self.hooks.get(&event).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }

    /// Runs every callback registered for `event`, in registration order.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing callback; later callbacks do not run.
    pub fn fire(&self, event: HookEvent, ctx: &HookContext<'_>) -> Result<(), AppError> {
        let Some(registrations) = self.hooks.get(&event) else {
            return Ok(());
        };

        for registration in registrations {
            debug!(event = %event, hook = %registration.label, "Running hook");

            if let Err(e) = (registration.callback)(event, ctx) {
                warn!(
                    event = %event,
                    hook = %registration.label,
                    error = %e,
                    "Hook failed"
                );
                return Err(e);
            }
        }

        Ok(())
    }
}

impl fmt::Debug for HookPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(&'static str, usize)> = self
            .hooks
            .iter()
            .map(|(event, regs)| (event.as_str(), regs.len()))
            .collect();
        counts.sort_unstable();
        f.debug_struct("HookPipeline")
            .field("hooks", &counts)
            .finish()
    }
}
