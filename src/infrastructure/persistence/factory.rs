//! Backend selection from configuration.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::{MemoryBackend, PgBackend, PgBackendOptions, PgRequestLogRepository};
use crate::config::{BackendKind, Config};
use crate::domain::audit_worker::run_audit_worker;
use crate::domain::repositories::StorageBackend;

pub struct BackendFactory;

/// A freshly created backend and the background task it feeds, if any.
pub struct CreatedBackend {
    pub backend: Arc<dyn StorageBackend>,
    pub audit_worker: Option<JoinHandle<()>>,
}

impl BackendFactory {
    /// Builds the backend selected by `config.backend`.
    ///
    /// For PostgreSQL this connects the pool and, when `log_request_info` is set,
    /// starts the audit worker. The backend is not initialized yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or the database is unreachable.
    pub async fn create(config: &Config) -> Result<CreatedBackend> {
        let mut audit_worker = None;
        let backend: Arc<dyn StorageBackend> = match config.backend {
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
            BackendKind::Postgres => {
                let options = config.postgres_options()?;
                let pool = connect_pool(&config.database_url()?, &options).await?;
                info!("Connected to database");

                let pool = Arc::new(pool);
                let mut backend = PgBackend::new(pool.clone());

                if options.log_request_info {
                    let (audit_tx, audit_rx) = mpsc::channel(options.audit_queue_capacity);
                    let repository = Arc::new(PgRequestLogRepository::new(pool));
                    audit_worker = Some(tokio::spawn(run_audit_worker(audit_rx, repository)));
                    info!("Audit worker started");
                    backend = backend.with_audit_log(audit_tx);
                }

                Arc::new(backend)
            }
        };

        info!(backend = backend.name(), "Storage backend selected");
        Ok(CreatedBackend {
            backend,
            audit_worker,
        })
    }
}

/// Opens a PostgreSQL pool tuned by `options`.
///
/// # Errors
///
/// Returns an error if the first connection cannot be established.
pub async fn connect_pool(database_url: &str, options: &PgBackendOptions) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(options.max_connections)
        .acquire_timeout(Duration::from_secs(options.acquire_timeout_secs))
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}
