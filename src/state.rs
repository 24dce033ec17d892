//! Shared application state handed to every request.

use std::sync::Arc;

use crate::application::services::ShortenerService;
use crate::domain::hooks::HookPipeline;
use crate::infrastructure::templates::TemplateStore;
use crate::shutdown::FatalSignal;

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService>,
    pub hooks: HookPipeline,
    pub templates: Arc<TemplateStore>,
    pub fatal: FatalSignal,
}

impl AppState {
    pub fn new(
        shortener: Arc<ShortenerService>,
        hooks: HookPipeline,
        templates: Arc<TemplateStore>,
        fatal: FatalSignal,
    ) -> Self {
        Self {
            shortener,
            hooks,
            templates,
            fatal,
        }
    }
}
