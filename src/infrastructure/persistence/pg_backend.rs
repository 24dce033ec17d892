//! PostgreSQL storage backend with a server-side counter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};

use crate::domain::entities::{RequestLogEntry, ShortMapping};
use crate::domain::hooks::{HookEvent, HookRegistry};
use crate::domain::repositories::StorageBackend;
use crate::error::AppError;
use crate::utils::code_generator::encode_counter;

/// Name of the counter row in `shortener_counters`.
pub const COUNTER_NAME: &str = "short_id";

/// Backend specific options, given as JSON on the command line.
///
/// ```json
/// { "log_request_info": true, "max_connections": 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PgBackendOptions {
    /// Record every served redirect in `request_log`.
    pub log_request_info: bool,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection before failing the request.
    pub acquire_timeout_secs: u64,
    /// Audit entries buffered between the redirect hook and the writer.
    pub audit_queue_capacity: usize,
}

impl Default for PgBackendOptions {
    fn default() -> Self {
        Self {
            log_request_info: true,
            max_connections: 10,
            acquire_timeout_secs: 30,
            audit_queue_capacity: 10_000,
        }
    }
}

/// Stores mappings in `short_mappings` and mints identifiers from a counter row.
///
/// # Allocation
///
/// A shorten request first looks up all of its URLs in one query. Each URL still
/// unknown gets a value from `UPDATE ... SET value = value + 1 RETURNING value`,
/// which PostgreSQL serializes, and is then inserted.
///
/// # Failure Handling
///
/// - Insert fails after the increment: the error is returned and the counter value is
///   logged as lost. Identifiers may have gaps; mappings are never silently dropped.
/// - Insert hits the unique `long_url` constraint (another request won the race): the
///   winner's identifier is read back and returned.
pub struct PgBackend {
    pool: Arc<PgPool>,
    audit_tx: Option<mpsc::Sender<RequestLogEntry>>,
}

impl PgBackend {
    /// Creates a backend without request logging.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            audit_tx: None,
        }
    }

    /// Enables the `after_short_redirect_response` audit hook, feeding `audit_tx`.
    pub fn with_audit_log(mut self, audit_tx: mpsc::Sender<RequestLogEntry>) -> Self {
        self.audit_tx = Some(audit_tx);
        self
    }

    /// Current counter value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Fatal`] if the counter row does not exist.
    pub async fn counter(&self) -> Result<u64, AppError> {
        let value: Option<i64> =
            sqlx::query_scalar("SELECT value FROM shortener_counters WHERE name = $1")
                .bind(COUNTER_NAME)
                .fetch_optional(self.pool.as_ref())
                .await?;

        counter_value(value)
    }

    /// Number of stored mappings.
    pub async fn count_mappings(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_mappings")
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(count)
    }

    /// Most recently created mappings, newest first.
    pub async fn recent_mappings(&self, limit: i64) -> Result<Vec<ShortMapping>, AppError> {
        let mappings = sqlx::query_as::<_, ShortMapping>(
            r#"
            SELECT short_id, long_url, created_at
            FROM short_mappings
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(mappings)
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<String>, AppError> {
        let short_id: Option<String> =
            sqlx::query_scalar("SELECT short_id FROM short_mappings WHERE long_url = $1")
                .bind(long_url)
                .fetch_optional(self.pool.as_ref())
                .await?;
        Ok(short_id)
    }

    /// Atomically increments the counter and returns the new value.
    async fn next_counter(&self) -> Result<u64, AppError> {
        let value: Option<i64> = sqlx::query_scalar(
            "UPDATE shortener_counters SET value = value + 1 WHERE name = $1 RETURNING value",
        )
        .bind(COUNTER_NAME)
        .fetch_optional(self.pool.as_ref())
        .await?;

        counter_value(value)
    }

    /// Allocates a counter value for `long_url` and stores the new mapping.
    async fn mint(&self, long_url: &str) -> Result<String, AppError> {
        let counter = self.next_counter().await?;
        let short_id = encode_counter(counter);

        let inserted: Option<String> = sqlx::query_scalar(
            r#"
            INSERT INTO short_mappings (short_id, long_url)
            VALUES ($1, $2)
            ON CONFLICT (long_url) DO NOTHING
            RETURNING short_id
            "#,
        )
        .bind(&short_id)
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| {
            error!(
                counter,
                %short_id,
                %long_url,
                error = %e,
                "Failed to insert mapping, counter value is lost"
            );
            AppError::from(e)
        })?;

        match inserted {
            Some(short_id) => {
                debug!(%short_id, %long_url, counter, "Short ID created");
                Ok(short_id)
            }
            None => {
                warn!(
                    counter,
                    %long_url,
                    "Long URL was shortened concurrently, counter value is unused"
                );
                self.find_by_long_url(long_url).await?.ok_or_else(|| {
                    AppError::operational(
                        "Mapping disappeared after insert conflict",
                        json!({ "long_url": long_url }),
                    )
                })
            }
        }
    }
}

fn counter_value(value: Option<i64>) -> Result<u64, AppError> {
    let value = value.ok_or_else(|| {
        AppError::fatal(
            "Identifier counter is missing",
            json!({ "counter": COUNTER_NAME }),
        )
    })?;

    u64::try_from(value).map_err(|_| {
        AppError::fatal(
            "Identifier counter is negative",
            json!({ "counter": COUNTER_NAME, "value": value }),
        )
    })
}

#[async_trait]
impl StorageBackend for PgBackend {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn initialize(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(self.pool.as_ref())
            .await
            .map_err(|e| {
                AppError::fatal(
                    "Failed to prepare database schema",
                    json!({ "reason": e.to_string() }),
                )
            })?;

        let created = sqlx::query(
            "INSERT INTO shortener_counters (name, value) VALUES ($1, 0) ON CONFLICT (name) DO NOTHING",
        )
        .bind(COUNTER_NAME)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| {
            AppError::fatal(
                "Failed to create identifier counter",
                json!({ "reason": e.to_string() }),
            )
        })?;

        if created.rows_affected() == 1 {
            info!(counter = COUNTER_NAME, "Identifier counter created");
        } else {
            debug!(counter = COUNTER_NAME, "Identifier counter already present");
        }

        Ok(())
    }

    async fn resolve_or_create(&self, long_url: &str) -> Result<String, AppError> {
        if let Some(short_id) = self.find_by_long_url(long_url).await? {
            debug!(%short_id, %long_url, "Short ID found, not creating a new one");
            return Ok(short_id);
        }

        self.mint(long_url).await
    }

    async fn resolve_or_create_batch(
        &self,
        long_urls: &[String],
    ) -> Result<Vec<(String, String)>, AppError> {
        let existing = sqlx::query_as::<_, ShortMapping>(
            r#"
            SELECT short_id, long_url, created_at
            FROM short_mappings
            WHERE long_url = ANY($1)
            "#,
        )
        .bind(long_urls)
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut known: HashMap<String, String> = existing
            .into_iter()
            .map(|m| (m.long_url, m.short_id))
            .collect();

        let mut resolved = Vec::with_capacity(long_urls.len());
        for long_url in long_urls {
            let short_id = match known.get(long_url) {
                Some(short_id) => short_id.clone(),
                None => {
                    let short_id = self.mint(long_url).await?;
                    known.insert(long_url.clone(), short_id.clone());
                    short_id
                }
            };
            resolved.push((long_url.clone(), short_id));
        }

        Ok(resolved)
    }

    async fn lookup(&self, short_id: &str) -> Result<Option<String>, AppError> {
        let long_url: Option<String> =
            sqlx::query_scalar("SELECT long_url FROM short_mappings WHERE short_id = $1")
                .bind(short_id)
                .fetch_optional(self.pool.as_ref())
                .await?;
        Ok(long_url)
    }

    fn register_hooks(&self, registry: &mut HookRegistry) {
        let Some(audit_tx) = self.audit_tx.clone() else {
            return;
        };

        registry.register(
            HookEvent::AfterShortRedirectResponse,
            "postgres-request-log",
            move |_, ctx| {
                let Some(entry) = RequestLogEntry::from_hook(ctx) else {
                    return Ok(());
                };

                match audit_tx.try_send(entry) {
                    Ok(()) => Ok(()),
                    Err(TrySendError::Full(entry)) => {
                        warn!(short_id = %entry.short_id, "Audit queue full, request log dropped");
                        Ok(())
                    }
                    Err(TrySendError::Closed(_)) => Err(AppError::operational(
                        "Request log unavailable",
                        json!({ "reason": "audit worker stopped" }),
                    )),
                }
            },
        );
    }
}
