//! Storage backend implementations.
//!
//! # Backends
//!
//! - [`MemoryBackend`] - volatile, process-local
//! - [`PgBackend`] - PostgreSQL, with optional request logging through
//!   [`PgRequestLogRepository`]
//!
//! [`BackendFactory`] picks one from configuration.

pub mod factory;
pub mod memory_backend;
pub mod pg_backend;
pub mod pg_request_log_repository;

pub use factory::{BackendFactory, CreatedBackend, connect_pool};
pub use memory_backend::MemoryBackend;
pub use pg_backend::{PgBackend, PgBackendOptions};
pub use pg_request_log_repository::PgRequestLogRepository;
