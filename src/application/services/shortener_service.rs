//! Shortening and resolution on top of the selected storage backend.

use axum::http::StatusCode;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::repositories::StorageBackend;
use crate::error::AppError;
use crate::utils::code_generator::is_valid_short_id;
use crate::utils::url_normalizer::normalize_url;

/// Settings affecting the URLs and redirects the service hands out.
#[derive(Debug, Clone)]
pub struct ShortenerSettings {
    /// Host used in short URLs when the request carries no `Host` header.
    pub public_host: String,
    /// Port appended to `public_host` unless it is 80.
    pub public_port: u16,
    /// Answer redirects with 301 instead of 302.
    pub permanent_redirect: bool,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self {
            public_host: "127.0.0.1".to_string(),
            public_port: 8080,
            permanent_redirect: false,
        }
    }
}

pub struct ShortenerService {
    backend: Arc<dyn StorageBackend>,
    settings: ShortenerSettings,
}

impl ShortenerService {
    pub fn new(backend: Arc<dyn StorageBackend>, settings: ShortenerSettings) -> Self {
        Self { backend, settings }
    }

    /// Shortens every URL of one request.
    ///
    /// URLs without a scheme get `http://`. The result maps each normalized long URL
    /// to its short URL and is only produced once all URLs are resolved.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Operational`] for an empty URL list or a blank URL, and
    /// passes through backend errors.
    pub async fn shorten(
        &self,
        host: Option<&str>,
        raw_urls: &[String],
    ) -> Result<BTreeMap<String, String>, AppError> {
        if raw_urls.is_empty() {
            return Err(AppError::operational(
                "Could not parse short url string: no URLs given",
                json!({}),
            ));
        }

        let long_urls = raw_urls
            .iter()
            .map(|raw| {
                normalize_url(raw).map_err(|e| {
                    AppError::operational(
                        format!("Could not parse short url string: {e}"),
                        json!({ "url": raw }),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let resolved = self.backend.resolve_or_create_batch(&long_urls).await?;

        let shortened = resolved
            .into_iter()
            .map(|(long_url, short_id)| {
                let short_url = self.build_short_url(host, &short_id);
                (long_url, short_url)
            })
            .collect::<BTreeMap<_, _>>();

        debug!(count = shortened.len(), "URLs shortened");
        Ok(shortened)
    }

    /// Finds the long URL for `short_id`.
    ///
    /// Identifiers with characters outside the short-id alphabet are rejected before
    /// the backend is asked.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for malformed or unknown identifiers.
    pub async fn resolve(&self, short_id: &str) -> Result<String, AppError> {
        if !is_valid_short_id(short_id) {
            debug!(%short_id, "Rejected malformed short ID");
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "short_id": short_id, "reason": "invalid characters" }),
            ));
        }

        self.backend.lookup(short_id).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "short_id": short_id }))
        })
    }

    /// Builds the public short URL: `http://` plus the host the client addressed, or
    /// the configured host (and port, unless 80) when the request names none.
    pub fn build_short_url(&self, host: Option<&str>, short_id: &str) -> String {
        match host {
            Some(host) => format!("http://{host}/{short_id}"),
            None if self.settings.public_port == 80 => {
                format!("http://{}/{short_id}", self.settings.public_host)
            }
            None => format!(
                "http://{}:{}/{short_id}",
                self.settings.public_host, self.settings.public_port
            ),
        }
    }

    /// 301 when permanent redirects are configured, 302 otherwise.
    pub fn redirect_status(&self) -> StatusCode {
        if self.settings.permanent_redirect {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::FOUND
        }
    }
}
