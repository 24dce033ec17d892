//! Domain layer: entities, the request model, hooks and storage contracts.
//!
//! - [`entities`] - Core data structures
//! - [`request`] - Per-request context and classification
//! - [`hooks`] - Lifecycle hook registry and pipeline
//! - [`repositories`] - Storage trait definitions
//! - [`audit_worker`] - Asynchronous redirect audit writer
//!
//! # Audit Flow
//!
//! 1. A redirect is served and `after_short_redirect_response` fires
//! 2. The persistent backend's hook queues a [`entities::RequestLogEntry`]
//! 3. [`audit_worker::run_audit_worker`] writes it via [`repositories::RequestLogRepository`]

pub mod audit_worker;
pub mod entities;
pub mod hooks;
pub mod repositories;
pub mod request;
