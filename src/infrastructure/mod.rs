//! Infrastructure layer for external integrations.
//!
//! Implements the storage capability defined by the domain layer and gives access
//! to files on disk.
//!
//! # Modules
//!
//! - [`persistence`] - In-memory and PostgreSQL storage backends
//! - [`templates`] - Template directory reader

pub mod persistence;
pub mod templates;
