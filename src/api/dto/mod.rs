//! Request parsing and response shaping for the dispatch engine.

pub mod shorten;

pub use shorten::parse_shorten_param;
