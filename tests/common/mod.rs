#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use hoplink::application::services::{ShortenerService, ShortenerSettings};
use hoplink::domain::hooks::{HookEvent, HookRegistry};
use hoplink::domain::repositories::StorageBackend;
use hoplink::error::AppError;
use hoplink::infrastructure::persistence::MemoryBackend;
use hoplink::infrastructure::templates::TemplateStore;
use hoplink::routes::app_router;
use hoplink::shutdown::FatalSignal;
use hoplink::state::AppState;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::Layer;

pub const PEER_ADDR: &str = "127.0.0.1:12345";

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = PEER_ADDR.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// Wraps a backend and counts the calls that reach it.
pub struct CountingBackend {
    inner: MemoryBackend,
    pub lookups: AtomicUsize,
    pub resolves: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            lookups: AtomicUsize::new(0),
            resolves: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageBackend for CountingBackend {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn initialize(&self) -> Result<(), AppError> {
        self.inner.initialize().await
    }

    async fn resolve_or_create(&self, long_url: &str) -> Result<String, AppError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_or_create(long_url).await
    }

    async fn lookup(&self, short_id: &str) -> Result<Option<String>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(short_id).await
    }
}

/// Backend whose every call fails with a fixed error kind.
pub struct FailingBackend {
    fatal: bool,
}

impl FailingBackend {
    pub fn fatal() -> Self {
        Self { fatal: true }
    }

    pub fn operational() -> Self {
        Self { fatal: false }
    }

    fn error(&self) -> AppError {
        if self.fatal {
            AppError::fatal("Identifier counter is missing", json!({}))
        } else {
            AppError::operational("Database error", json!({ "reason": "connection reset" }))
        }
    }
}

#[async_trait]
impl StorageBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn initialize(&self) -> Result<(), AppError> {
        Err(self.error())
    }

    async fn resolve_or_create(&self, _long_url: &str) -> Result<String, AppError> {
        Err(self.error())
    }

    async fn lookup(&self, _short_id: &str) -> Result<Option<String>, AppError> {
        Err(self.error())
    }
}

/// Records the name of every event fired, in order.
pub fn record_all_events(registry: &mut HookRegistry) -> Arc<Mutex<Vec<&'static str>>> {
    let events = Arc::new(Mutex::new(Vec::new()));

    for event in HookEvent::ALL {
        let events = events.clone();
        registry.register(event, "recorder", move |event, _| {
            events.lock().unwrap().push(event.as_str());
            Ok(())
        });
    }

    events
}

pub struct TestApp {
    pub server: TestServer,
    pub fatal: FatalSignal,
}

pub struct TestAppBuilder {
    backend: Arc<dyn StorageBackend>,
    registry: HookRegistry,
    settings: ShortenerSettings,
    templates: TemplateStore,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            backend: Arc::new(MemoryBackend::new()),
            registry: HookRegistry::new(),
            settings: ShortenerSettings::default(),
            templates: TemplateStore::new("./templates/", None),
        }
    }

    pub fn backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn hooks(mut self, registry: HookRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn permanent_redirect(mut self) -> Self {
        self.settings.permanent_redirect = true;
        self
    }

    pub fn templates(mut self, templates: TemplateStore) -> Self {
        self.templates = templates;
        self
    }

    /// Router and fatal signal without a test server around them.
    pub fn into_router(self) -> (Router, FatalSignal) {
        let fatal = FatalSignal::new();
        let mut registry = self.registry;
        self.backend.register_hooks(&mut registry);

        let state = AppState::new(
            Arc::new(ShortenerService::new(self.backend, self.settings)),
            registry.freeze(),
            Arc::new(self.templates),
            fatal.clone(),
        );

        (app_router(state), fatal)
    }

    pub fn build(self) -> TestApp {
        let (app, fatal) = self.into_router();
        let server = TestServer::new(app.layer(MockConnectInfoLayer)).unwrap();

        TestApp { server, fatal }
    }
}

pub fn memory_app() -> TestApp {
    TestAppBuilder::new().build()
}
