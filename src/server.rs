//! HTTP server initialization and runtime setup.
//!
//! Handles backend preparation, hook collection and the Axum server lifecycle.

use crate::application::services::{ShortenerService, ShortenerSettings};
use crate::config::Config;
use crate::domain::audit_worker::wait_for_audit_worker;
use crate::domain::hooks::{HookEvent, HookRegistry};
use crate::domain::repositories::StorageBackend;
use crate::infrastructure::persistence::{BackendFactory, CreatedBackend};
use crate::infrastructure::templates::TemplateStore;
use crate::routes::app_router;
use crate::shutdown::{FATAL_DRAIN_TIMEOUT, FatalSignal, fatal_deadline, shutdown_signal};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Time the audit worker gets to write out queued entries after the server stopped.
const AUDIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Prepares `backend` and assembles the shared state.
///
/// Runs [`StorageBackend::initialize`], lets the backend add its hooks to
/// `registry`, then freezes the registry.
///
/// # Errors
///
/// Returns an error if the backend cannot be initialized; the server must not start.
pub async fn build_state(
    config: &Config,
    backend: Arc<dyn StorageBackend>,
    mut registry: HookRegistry,
    fatal: FatalSignal,
) -> Result<AppState> {
    if let Err(e) = backend.initialize().await {
        error!(
            severity = "critical",
            backend = backend.name(),
            error = %e,
            details = %e.details(),
            "Storage backend initialization failed"
        );
        return Err(e).context("Failed to initialize storage backend");
    }
    info!(backend = backend.name(), "Storage backend initialized");

    backend.register_hooks(&mut registry);
    let hooks = registry.freeze();
    for event in HookEvent::ALL {
        let count = hooks.len(event);
        if count > 0 {
            debug!(event = %event, count, "Hooks registered");
        }
    }

    let settings = ShortenerSettings {
        public_host: config.host.clone(),
        public_port: config.port,
        permanent_redirect: config.permanent_redirect,
    };
    let shortener = Arc::new(ShortenerService::new(backend, settings));
    let templates = Arc::new(TemplateStore::new(
        config.template_path.clone(),
        config.index_page.clone(),
    ));

    Ok(AppState::new(shortener, hooks, templates, fatal))
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (and the audit worker, if enabled)
/// - Hook pipeline
/// - Axum HTTP server with graceful shutdown
///
/// Once serving ends, the audit worker gets a short window to flush its queue.
///
/// # Errors
///
/// Returns an error if:
/// - The backend cannot be created or initialized
/// - Server bind fails
/// - Server runtime error occurs
/// - A fatal error stopped the server
pub async fn run(config: Config) -> Result<()> {
    let CreatedBackend {
        backend,
        audit_worker,
    } = BackendFactory::create(&config).await?;
    let fatal = FatalSignal::new();
    let hooks = HookRegistry::new();
    let state = build_state(&config, backend, hooks, fatal.clone()).await?;

    let app = app_router(state);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    let served = serve(listener, app, fatal, FATAL_DRAIN_TIMEOUT).await;

    if let Some(worker) = audit_worker {
        wait_for_audit_worker(worker, AUDIT_DRAIN_TIMEOUT).await;
    }

    served?;
    info!("Server stopped");
    Ok(())
}

/// Serves `app` on `listener` until Ctrl+C or a fatal error.
///
/// Shutdown is graceful, but after a fatal error in-flight requests only get
/// `drain_timeout` to finish before serving is abandoned.
///
/// # Errors
///
/// Returns an error on a server I/O failure or when `fatal` stopped the server.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    fatal: FatalSignal,
    drain_timeout: Duration,
) -> Result<()> {
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(fatal.clone()));

    tokio::select! {
        result = server.into_future() => result.context("Server error")?,
        () = fatal_deadline(fatal.clone(), drain_timeout) => {
            error!(
                severity = "critical",
                timeout_ms = drain_timeout.as_millis() as u64,
                "Requests still in flight after fatal error, abandoning them"
            );
        }
    }

    if fatal.is_triggered() {
        anyhow::bail!("Server stopped after a fatal error");
    }

    Ok(())
}
