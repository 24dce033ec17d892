//! Storage backend capability shared by every storage strategy.

use crate::domain::hooks::HookRegistry;
use crate::error::AppError;
use async_trait::async_trait;

/// Owns the URL mappings and the counter used to mint identifiers.
///
/// The dispatch engine only ever talks to storage through this trait. A backend is
/// picked at startup from configuration.
///
/// # Guarantees
///
/// - Shortening the same long URL again returns the identifier minted the first time;
///   no counter value is spent on it.
/// - Two allocations never observe the same counter value.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryBackend`] - volatile, in-process
/// - [`crate::infrastructure::persistence::PgBackend`] - PostgreSQL with a counter row
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short name used in logs (`memory`, `postgres`).
    fn name(&self) -> &'static str;

    /// Prepares storage before the server accepts connections.
    ///
    /// Creates the counter with value `0` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Fatal`] if storage cannot be prepared. The caller must not
    /// start serving.
    async fn initialize(&self) -> Result<(), AppError>;

    /// Returns the identifier for `long_url`, minting one if the URL is new.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Operational`] on store failures and [`AppError::Fatal`] if
    /// the counter has disappeared.
    async fn resolve_or_create(&self, long_url: &str) -> Result<String, AppError>;

    /// Resolves every URL of one shorten request.
    ///
    /// Returns `(long_url, short_id)` pairs in input order, only once all of them are
    /// resolved. The default resolves URLs one after another; backends with a cheaper
    /// batch lookup override it.
    ///
    /// # Errors
    ///
    /// Fails as a whole if any URL fails; no partial result is returned.
    async fn resolve_or_create_batch(
        &self,
        long_urls: &[String],
    ) -> Result<Vec<(String, String)>, AppError> {
        let mut resolved = Vec::with_capacity(long_urls.len());
        for long_url in long_urls {
            let short_id = self.resolve_or_create(long_url).await?;
            resolved.push((long_url.clone(), short_id));
        }
        Ok(resolved)
    }

    /// Finds the long URL for a short identifier. Never writes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Operational`] on store failures.
    async fn lookup(&self, short_id: &str) -> Result<Option<String>, AppError>;

    /// Attaches backend-specific hooks (e.g. audit logging). Does nothing by default.
    fn register_hooks(&self, _registry: &mut HookRegistry) {}
}
