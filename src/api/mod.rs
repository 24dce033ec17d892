//! HTTP layer: request dispatch, payload parsing and middleware.
//!
//! # Modules
//!
//! - [`dto`] - Parsing of request parameters
//! - [`handlers`] - The dispatch engine and its per-kind handlers
//! - [`middleware`] - Request tracing

pub mod dto;
pub mod handlers;
pub mod middleware;
