//! Repository trait definitions for the domain layer.
//!
//! These traits are the seams between the dispatch engine and storage. Concrete
//! implementations live in `crate::infrastructure::persistence`; `mockall` mocks are
//! generated for unit tests.
//!
//! - [`StorageBackend`] - URL mappings and the identifier counter
//! - [`RequestLogRepository`] - Redirect audit records

pub mod request_log_repository;
pub mod storage_backend;

pub use request_log_repository::RequestLogRepository;
pub use storage_backend::StorageBackend;

#[cfg(test)]
pub use request_log_repository::MockRequestLogRepository;
#[cfg(test)]
pub use storage_backend::MockStorageBackend;
