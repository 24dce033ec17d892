//! Minimal normalization of URLs submitted for shortening.
//!
//! The service does not validate targets. It only makes sure every stored URL carries
//! a scheme, so that a bare `example.com` and `http://example.com` share one mapping
//! and the redirect `Location` is absolute.

use regex::Regex;
use std::sync::LazyLock;

/// Scheme prepended to URLs that arrive without one.
pub const DEFAULT_SCHEME: &str = "http://";

const SCHEME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9+.\-]*://";

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SCHEME_PATTERN).expect("valid scheme regex"));

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,
    #[error("URL must not contain control characters")]
    ControlCharacter,
}

/// Trims surrounding whitespace and prepends [`DEFAULT_SCHEME`] when no `scheme://`
/// prefix is present.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::Empty`] for blank input and
/// [`UrlNormalizationError::ControlCharacter`] when a control character remains after
/// trimming. Such a URL could never be sent back as a `Location` header.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("example.com").unwrap(), "http://example.com");
/// assert_eq!(normalize_url("https://example.com/a").unwrap(), "https://example.com/a");
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }
    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(UrlNormalizationError::ControlCharacter);
    }

    if SCHEME_PREFIX.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{DEFAULT_SCHEME}{trimmed}"))
    }
}
