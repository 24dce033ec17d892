//! Application layer services implementing business logic.
//!
//! Services sit between the dispatch engine and the storage backend: they
//! normalize input, enforce identifier rules and shape the results handed back
//! to HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Shortening and short ID resolution

pub mod services;
