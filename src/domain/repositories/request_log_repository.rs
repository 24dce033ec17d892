//! Repository trait for the redirect audit log.

use crate::domain::entities::RequestLogEntry;
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only store for [`RequestLogEntry`] records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRequestLogRepository`] - PostgreSQL table
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestLogRepository: Send + Sync {
    /// Persists one entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Operational`] on database errors.
    async fn record(&self, entry: &RequestLogEntry) -> Result<(), AppError>;
}
