//! Short mapping entity: one long URL and the identifier minted for it.

use chrono::{DateTime, Utc};

/// The association between a short identifier and its long URL.
///
/// Both directions are unique: an identifier maps to one URL and a URL is only ever
/// given one identifier. Mappings are created once and never modified.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShortMapping {
    pub short_id: String,
    pub long_url: String,
    /// Set by the persistent store; `None` for mappings that only live in memory.
    #[sqlx(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ShortMapping {
    pub fn new(short_id: impl Into<String>, long_url: impl Into<String>) -> Self {
        Self {
            short_id: short_id.into(),
            long_url: long_url.into(),
            created_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_creation() {
        let mapping = ShortMapping::new("AQ", "http://example.com");

        assert_eq!(mapping.short_id, "AQ");
        assert_eq!(mapping.long_url, "http://example.com");
        assert!(mapping.created_at.is_none());
    }
}
