//! Short identifier encoding and validation.
//!
//! Identifiers are the URL-safe base64 encoding (`-` and `_` instead of `+` and `/`,
//! no padding) of the minimal big-endian bytes of a counter value. Distinct byte
//! strings always produce distinct unpadded encodings, so the mapping from counter
//! values to identifiers is injective.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// The 64 characters an identifier may contain.
pub const SHORT_ID_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Encodes a counter value as a short identifier.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(encode_counter(0), "AA");
/// assert_eq!(encode_counter(1), "AQ");
/// assert_eq!(encode_counter(256), "AQA");
/// ```
pub fn encode_counter(value: u64) -> String {
    let bytes = value.to_be_bytes();
    let first = bytes
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(bytes.len() - 1);

    URL_SAFE_NO_PAD.encode(&bytes[first..])
}

/// Returns `true` if `short_id` is non-empty and uses only [`SHORT_ID_ALPHABET`].
pub fn is_valid_short_id(short_id: &str) -> bool {
    !short_id.is_empty()
        && short_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode_counter(0), "AA");
        assert_eq!(encode_counter(1), "AQ");
        assert_eq!(encode_counter(255), "_w");
        assert_eq!(encode_counter(256), "AQA");
        assert_eq!(encode_counter(u64::MAX), "__________8");
    }

    #[test]
    fn test_encode_is_deterministic() {
        assert_eq!(encode_counter(123_456), encode_counter(123_456));
    }

    #[test]
    fn test_encode_is_injective_over_range() {
        let mut seen = HashSet::new();

        for value in 0..70_000u64 {
            assert!(
                seen.insert(encode_counter(value)),
                "duplicate identifier for {value}"
            );
        }
    }

    #[test]
    fn test_encode_injective_across_byte_boundaries() {
        let values = [
            0xFF,
            0x100,
            0xFFFF,
            0x1_0000,
            0xFF_FFFF,
            0x100_0000,
            u32::MAX as u64,
            u32::MAX as u64 + 1,
            u64::MAX - 1,
            u64::MAX,
        ];
        let codes: HashSet<String> = values.iter().map(|v| encode_counter(*v)).collect();
        assert_eq!(codes.len(), values.len());
    }

    #[test]
    fn test_encode_uses_only_alphabet() {
        for value in (0..u64::MAX).step_by(u64::MAX as usize / 997).take(997) {
            let code = encode_counter(value);
            assert!(!code.contains('='));
            assert!(code.chars().all(|c| SHORT_ID_ALPHABET.contains(c)));
        }
    }

    #[test]
    fn test_alphabet_has_64_unique_symbols() {
        let symbols: HashSet<char> = SHORT_ID_ALPHABET.chars().collect();
        assert_eq!(symbols.len(), 64);
    }

    #[test]
    fn test_valid_short_ids() {
        assert!(is_valid_short_id("AQ"));
        assert!(is_valid_short_id("abc-XYZ_09"));
        assert!(is_valid_short_id(&encode_counter(987_654_321)));
    }

    #[test]
    fn test_invalid_short_ids() {
        assert!(!is_valid_short_id(""));
        assert!(!is_valid_short_id("abc/def"));
        assert!(!is_valid_short_id("abc+def"));
        assert!(!is_valid_short_id("abc="));
        assert!(!is_valid_short_id("has space"));
        assert!(!is_valid_short_id("ünïcode"));
        assert!(!is_valid_short_id("favicon.ico"));
    }
}
