//! Process shutdown triggers.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// How long in-flight requests may keep running once a fatal error was reported.
pub const FATAL_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Raised by the request boundary when a fatal error makes further serving pointless.
///
/// Cloned into the application state; the server waits on it alongside Ctrl+C.
#[derive(Debug, Clone)]
pub struct FatalSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for FatalSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl FatalSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Requests shutdown. Further calls are no-ops.
    pub fn trigger(&self) {
        self.tx.send_if_modified(|triggered| {
            if *triggered {
                false
            } else {
                *triggered = true;
                true
            }
        });
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`Self::trigger`] has been called.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

/// Resolves on Ctrl+C or when `fatal` is triggered.
pub async fn shutdown_signal(fatal: FatalSignal) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Shutdown requested, draining connections"),
        _ = fatal.triggered() => error!(severity = "critical", "Fatal error, shutting down"),
    }
}

/// Resolves `grace` after `fatal` is triggered. Never resolves otherwise.
///
/// Caps how long the graceful drain may run after a fatal error.
pub async fn fatal_deadline(fatal: FatalSignal, grace: Duration) {
    fatal.triggered().await;
    tokio::time::sleep(grace).await;
}
