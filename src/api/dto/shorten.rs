//! Parsing of the `shorten` query parameter.

use serde_json::{Value, json};

use crate::error::AppError;

/// Splits the raw `shorten` value into the URLs to shorten.
///
/// A value that parses as a JSON array must contain only strings. Any other value,
/// JSON or not, is taken verbatim as a single URL.
///
/// # Errors
///
/// Returns [`AppError::Operational`] if the array holds anything but strings.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_shorten_param("a.com").unwrap(), vec!["a.com"]);
/// assert_eq!(parse_shorten_param(r#"["a.com","b.com"]"#).unwrap(), vec!["a.com", "b.com"]);
/// ```
pub fn parse_shorten_param(raw: &str) -> Result<Vec<String>, AppError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(url) => Ok(url),
                other => Err(AppError::operational(
                    format!("Could not parse short url string: {raw}"),
                    json!({ "unexpected": other }),
                )),
            })
            .collect(),
        _ => Ok(vec![raw.to_string()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_url() {
        assert_eq!(
            parse_shorten_param("example.com").unwrap(),
            vec!["example.com"]
        );
    }

    #[test]
    fn test_json_array() {
        assert_eq!(
            parse_shorten_param(r#"["a.com", "http://b.com/x?y=1"]"#).unwrap(),
            vec!["a.com", "http://b.com/x?y=1"]
        );
    }

    #[test]
    fn test_empty_array_yields_no_urls() {
        assert!(parse_shorten_param("[]").unwrap().is_empty());
    }

    #[test]
    fn test_array_with_non_string_rejected() {
        let err = parse_shorten_param(r#"["a.com", 42]"#).unwrap_err();
        assert!(matches!(err, AppError::Operational { .. }));
        assert_eq!(
            err.to_string(),
            r#"Could not parse short url string: ["a.com", 42]"#
        );
    }

    #[test]
    fn test_broken_json_is_a_single_url() {
        assert_eq!(parse_shorten_param("[a.com").unwrap(), vec!["[a.com"]);
    }

    #[test]
    fn test_scalar_json_is_a_single_url() {
        assert_eq!(parse_shorten_param("8080").unwrap(), vec!["8080"]);
    }
}
