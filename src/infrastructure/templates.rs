//! Read-only access to the template directory.
//!
//! Serves `/t/<relative-path>` and the optional index page. Both are plain files
//! below the configured root; nothing is rendered.

use serde_json::json;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
    index_page: Option<String>,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>, index_page: Option<String>) -> Self {
        Self {
            root: root.into(),
            index_page,
        }
    }

    /// Whether `GET /` serves a page instead of a 404.
    pub fn has_index(&self) -> bool {
        self.index_page.is_some()
    }

    /// Reads a file below the template root.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the path escapes the root (`..`, absolute
    /// components) or the file cannot be read.
    pub async fn read_template(&self, relative_path: &str) -> Result<String, AppError> {
        let path = self.resolve(relative_path)?;
        debug!(path = %path.display(), "Reading template");

        tokio::fs::read_to_string(&path).await.map_err(|e| {
            AppError::not_found(
                "Template not found",
                json!({ "path": relative_path, "reason": e.to_string() }),
            )
        })
    }

    /// Reads the configured index page.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no index page is configured or it cannot be read.
    pub async fn read_index(&self) -> Result<String, AppError> {
        let index_page = self
            .index_page
            .as_deref()
            .ok_or_else(|| AppError::not_found("No index page configured", json!({})))?;

        self.read_template(index_page).await
    }

    fn resolve(&self, relative_path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(relative_path);
        let mut components = relative.components().peekable();

        if components.peek().is_none()
            || !components.all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(AppError::not_found(
                "Template not found",
                json!({ "path": relative_path, "reason": "rejected path" }),
            ));
        }

        Ok(self.root.join(relative))
    }
}
