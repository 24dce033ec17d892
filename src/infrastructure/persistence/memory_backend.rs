//! Volatile in-memory storage backend.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::domain::entities::ShortMapping;
use crate::domain::repositories::StorageBackend;
use crate::error::AppError;
use crate::utils::code_generator::encode_counter;

#[derive(Debug, Default)]
struct MemoryState {
    counter: u64,
    by_short_id: HashMap<String, String>,
    by_long_url: HashMap<String, String>,
}

/// Keeps the counter and both indices in process memory.
///
/// All state sits behind one mutex and allocation happens in a single critical
/// section, so the two indices never disagree and no counter value is handed out
/// twice. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, AppError> {
        self.state.lock().map_err(|_| {
            AppError::operational(
                "In-memory store unavailable",
                json!({ "reason": "poisoned lock" }),
            )
        })
    }

    /// Current counter value, i.e. the number of identifiers minted so far.
    pub fn counter(&self) -> Result<u64, AppError> {
        Ok(self.state()?.counter)
    }

    /// Snapshot of all mappings, ordered by identifier.
    pub fn mappings(&self) -> Result<Vec<ShortMapping>, AppError> {
        let state = self.state()?;
        let mut mappings: Vec<ShortMapping> = state
            .by_short_id
            .iter()
            .map(|(short_id, long_url)| ShortMapping::new(short_id.clone(), long_url.clone()))
            .collect();
        mappings.sort_by(|a, b| a.short_id.cmp(&b.short_id));
        Ok(mappings)
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn initialize(&self) -> Result<(), AppError> {
        // The counter starts at zero with the struct; only verify it is reachable.
        let counter = self.counter().map_err(|e| {
            AppError::fatal(
                "In-memory store unavailable",
                json!({ "reason": e.to_string() }),
            )
        })?;
        debug!(counter, "In-memory backend ready");
        Ok(())
    }

    async fn resolve_or_create(&self, long_url: &str) -> Result<String, AppError> {
        let mut state = self.state()?;

        if let Some(short_id) = state.by_long_url.get(long_url) {
            debug!(%short_id, %long_url, "Short ID found, not creating a new one");
            return Ok(short_id.clone());
        }

        let next = state.counter.checked_add(1).ok_or_else(|| {
            AppError::operational(
                "Identifier counter exhausted",
                json!({ "counter": state.counter }),
            )
        })?;
        let short_id = encode_counter(next);

        state.counter = next;
        state
            .by_short_id
            .insert(short_id.clone(), long_url.to_string());
        state
            .by_long_url
            .insert(long_url.to_string(), short_id.clone());

        debug!(%short_id, %long_url, counter = next, "Short ID created");
        Ok(short_id)
    }

    async fn lookup(&self, short_id: &str) -> Result<Option<String>, AppError> {
        Ok(self.state()?.by_short_id.get(short_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    const URL: &str = "http://example.com";

    #[tokio::test]
    async fn test_initialize_starts_at_zero() {
        let backend = MemoryBackend::new();
        backend.initialize().await.unwrap();

        assert_eq!(backend.counter().unwrap(), 0);
        assert!(backend.mappings().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_identifier_encodes_one() {
        let backend = MemoryBackend::new();

        let short_id = backend.resolve_or_create(URL).await.unwrap();

        assert_eq!(short_id, encode_counter(1));
        assert_eq!(backend.counter().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let backend = MemoryBackend::new();

        let first = backend.resolve_or_create(URL).await.unwrap();
        let second = backend.resolve_or_create(URL).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.counter().unwrap(), 1);
        assert_eq!(backend.mappings().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_urls_get_distinct_ids() {
        let backend = MemoryBackend::new();

        let a = backend.resolve_or_create("http://a.com").await.unwrap();
        let b = backend.resolve_or_create("http://b.com").await.unwrap();

        assert_ne!(a, b);
        assert_eq!(backend.counter().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_lookup_round_trip() {
        let backend = MemoryBackend::new();

        let short_id = backend
            .resolve_or_create("http://example.com/a?b=c")
            .await
            .unwrap();

        assert_eq!(
            backend.lookup(&short_id).await.unwrap().as_deref(),
            Some("http://example.com/a?b=c")
        );
    }

    #[tokio::test]
    async fn test_lookup_unknown() {
        let backend = MemoryBackend::new();
        assert!(backend.lookup("doesnotexist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order_and_reuses_ids() {
        let backend = MemoryBackend::new();
        let existing = backend.resolve_or_create("http://b.com").await.unwrap();

        let urls = vec![
            "http://a.com".to_string(),
            "http://b.com".to_string(),
            "http://a.com".to_string(),
        ];
        let resolved = backend.resolve_or_create_batch(&urls).await.unwrap();

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].0, "http://a.com");
        assert_eq!(resolved[1], ("http://b.com".to_string(), existing));
        assert_eq!(resolved[0].1, resolved[2].1);
        assert_eq!(backend.counter().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_same_url_allocates_once() {
        let backend = Arc::new(MemoryBackend::new());
        let mut handles = vec![];

        for _ in 0..32 {
            let backend = Arc::clone(&backend);
            handles.push(tokio::spawn(async move {
                backend.resolve_or_create("http://same.com").await.unwrap()
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }

        assert_eq!(ids.len(), 1);
        assert_eq!(backend.counter().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_distinct_urls_never_share_ids() {
        let backend = Arc::new(MemoryBackend::new());
        let mut handles = vec![];

        for i in 0..64 {
            let backend = Arc::clone(&backend);
            handles.push(tokio::spawn(async move {
                backend
                    .resolve_or_create(&format!("http://site{i}.com"))
                    .await
                    .unwrap()
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }

        assert_eq!(ids.len(), 64);
        assert_eq!(backend.counter().unwrap(), 64);
        assert_eq!(backend.mappings().unwrap().len(), 64);
    }
}
