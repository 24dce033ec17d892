//! Core domain entities.
//!
//! - [`ShortMapping`] - A short identifier and the long URL it stands for
//! - [`RequestLogEntry`] - Audit record of a served redirect

pub mod mapping;
pub mod request_log;

pub use mapping::ShortMapping;
pub use request_log::RequestLogEntry;
