//! Request handlers behind the dispatch engine.
//!
//! [`dispatch_handler`] is the only handler mounted on the router; it classifies
//! each request and hands it to one of the per-kind modules.

pub mod dispatch;
pub mod redirect;
pub mod shorten;
pub mod templates;

pub use dispatch::dispatch_handler;
