//! Low-level text and number helpers shared by the format parsers.

use regex::Regex;

use super::types::error::{NoteError, Result};
use super::types::tags::TagMap;

/// Collects every `(key, value)` capture pair of `pattern` over `text`.
///
/// `pattern` must have exactly two capture groups. Text that does not match
/// is skipped, so garbage yields an empty map.
pub fn extract_pairs(pattern: &Regex, text: &str) -> TagMap {
    pattern
        .captures_iter(text)
        .map(|cap| (cap[1].to_string(), cap[2].to_string()))
        .collect()
}

/// Parses a decimal block address stored in a tag value.
///
/// `key` and `block` only feed the error message.
pub fn parse_address(value: &str, key: &str, block: u64) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        NoteError::MalformedFile(format!(
            "Non-numeric address {:?} under key '{}' in block at {}",
            value, key, block
        ))
    })
}

/// True for a non-empty string made only of ASCII digits.
pub fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
