//! Utility functions for identifier encoding, URL processing, and request handling.
//!
//! - [`code_generator`] - Short identifier encoding and validation
//! - [`url_normalizer`] - Scheme normalization for submitted URLs
//! - [`request_info`] - Host, header and client IP extraction

pub mod code_generator;
pub mod request_info;
pub mod url_normalizer;
