//! String formatting utilities.
//!
//! Provides hex prefix handling and truncation of long identifiers for logs.

/// Utility function to truncate an identifier for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
/// Works on characters, so identifiers that are not hex are safe too.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((end, _)) => format!("{}..", &id[..end]),
		None => id.to_string(),
	}
}

/// Removes "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Compares two hex encoded hashes, ignoring case and an optional `0x` prefix.
pub fn hashes_match(expected: &str, actual: &str) -> bool {
	without_0x_prefix(expected).eq_ignore_ascii_case(without_0x_prefix(actual))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("abc"), "abc");
		assert_eq!(truncate_id("0fa27a781a9086e8"), "0fa27a78..");
		assert_eq!(truncate_id("0fa27a78"), "0fa27a78");
		assert_eq!(truncate_id("abcdefgé-hash"), "abcdefgé..");
	}

	#[test]
	fn test_prefix_helpers() {
		assert_eq!(without_0x_prefix("0Xab"), "ab");
		assert_eq!(without_0x_prefix("0xab"), "ab");
		assert_eq!(without_0x_prefix("ab"), "ab");
	}

	#[test]
	fn test_hashes_match() {
		assert!(hashes_match("0xABCD", "abcd"));
		assert!(!hashes_match("abcd", "abce"));
		assert!(!hashes_match("mismatched hash", "abcd"));
	}
}
