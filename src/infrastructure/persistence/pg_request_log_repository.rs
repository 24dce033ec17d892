//! PostgreSQL implementation of the redirect audit log.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::RequestLogEntry;
use crate::domain::repositories::RequestLogRepository;
use crate::error::AppError;

/// Appends audit entries to the `request_log` table.
pub struct PgRequestLogRepository {
    pool: Arc<PgPool>,
}

impl PgRequestLogRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestLogRepository for PgRequestLogRepository {
    async fn record(&self, entry: &RequestLogEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO request_log
                (short_id, requested_url, redirected_url, user_agent, language, referer, ip, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&entry.short_id)
        .bind(&entry.requested_url)
        .bind(&entry.redirected_url)
        .bind(&entry.user_agent)
        .bind(&entry.language)
        .bind(&entry.referer)
        .bind(&entry.ip)
        .bind(entry.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
