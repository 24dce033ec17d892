//! Background worker persisting redirect audit records.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::entities::RequestLogEntry;
use crate::domain::repositories::RequestLogRepository;

/// Drains the audit channel until every sender is dropped.
///
/// A failed write is logged and the entry dropped; the redirect it describes has
/// already been served.
pub async fn run_audit_worker(
    mut rx: mpsc::Receiver<RequestLogEntry>,
    repository: Arc<dyn RequestLogRepository>,
) {
    while let Some(entry) = rx.recv().await {
        match repository.record(&entry).await {
            Ok(()) => debug!(short_id = %entry.short_id, "Request log saved"),
            Err(e) => error!(
                short_id = %entry.short_id,
                error = %e,
                details = %e.details(),
                "Failed to save request log"
            ),
        }
    }

    info!("Audit worker stopped");
}

/// Waits up to `timeout` for the worker to write out what is still queued.
///
/// The worker only finishes once every sender is gone, so the server state must be
/// dropped first. Entries left after the timeout are lost.
pub async fn wait_for_audit_worker(worker: JoinHandle<()>, timeout: Duration) {
    match tokio::time::timeout(timeout, worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Audit worker failed"),
        Err(_) => warn!(
            timeout_ms = timeout.as_millis() as u64,
            "Audit worker still busy at shutdown, queued request logs dropped"
        ),
    }
}
