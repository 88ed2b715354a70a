//! Character-count truncation for derived titles and previews.
//!
//! Truncation here counts *characters*, not bytes, because the limits come
//! from what fits in a conversation-list row. Cutting by byte index would
//! panic inside multi-byte characters; these helpers never do.

/// Ellipsis marker appended when a string is truncated.
pub const ELLIPSIS: &str = "...";

/// The longest prefix of `s` containing at most `max_chars` characters.
#[must_use]
pub fn char_prefix(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate `s` to `max_chars` characters, appending [`ELLIPSIS`] when
/// anything was cut. Strings that already fit are returned unchanged.
#[must_use]
pub fn ellipsize(s: &str, max_chars: usize) -> String {
    let prefix = char_prefix(s, max_chars);
    if prefix.len() == s.len() {
        s.to_owned()
    } else {
        format!("{prefix}{ELLIPSIS}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── char_prefix ──────────────────────────────────────────────────────

    #[test]
    fn prefix_within_limit() {
        assert_eq!(char_prefix("hello", 10), "hello");
    }

    #[test]
    fn prefix_exact_limit() {
        assert_eq!(char_prefix("hello", 5), "hello");
    }

    #[test]
    fn prefix_truncates() {
        assert_eq!(char_prefix("hello world", 5), "hello");
    }

    #[test]
    fn prefix_counts_chars_not_bytes() {
        // 'é' is 2 bytes but 1 char; '🦀' is 4 bytes but 1 char.
        assert_eq!(char_prefix("café🦀!", 5), "café🦀");
        assert_eq!(char_prefix("café🦀!", 4), "café");
    }

    #[test]
    fn prefix_empty() {
        assert_eq!(char_prefix("", 3), "");
        assert_eq!(char_prefix("abc", 0), "");
    }

    // ── ellipsize ────────────────────────────────────────────────────────

    #[test]
    fn ellipsize_fits_unchanged() {
        assert_eq!(ellipsize("soup", 10), "soup");
    }

    #[test]
    fn ellipsize_exact_fit_no_marker() {
        assert_eq!(ellipsize("ramen", 5), "ramen");
    }

    #[test]
    fn ellipsize_appends_marker() {
        assert_eq!(ellipsize("hello world", 5), "hello...");
    }

    #[test]
    fn ellipsize_multibyte_boundary() {
        assert_eq!(ellipsize("crème brûlée", 5), "crème...");
    }

    #[test]
    fn ellipsize_zero_chars() {
        assert_eq!(ellipsize("abc", 0), "...");
    }
}
