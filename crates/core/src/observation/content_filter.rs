//! Text normalization applied before anything is written: private-tag
//! redaction, length capping, and the digest that drives deduplication.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::constants::{MAX_TOPIC_KEY_LENGTH, REDACTION_TOKEN, TRUNCATION_MARKER};

/// Matches `<private>...</private>` spans, case-insensitive, across newlines.
#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static PRIVATE_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<private>.*?</private>").unwrap());

/// Replaces every private-marked span with [`REDACTION_TOKEN`] and trims the result.
#[must_use]
pub fn redact_private(text: &str) -> String {
    PRIVATE_TAG_REGEX.replace_all(text, REDACTION_TOKEN).trim().to_owned()
}

/// Cuts `text` to `max_chars` characters, appending [`TRUNCATION_MARKER`] if cut.
#[must_use]
pub fn truncate_content(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_idx]),
        None => text.to_owned(),
    }
}

/// Cuts `text` to `max_chars` characters, appending `...` if cut.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_owned(),
    }
}

/// Joins whitespace-separated words with single spaces.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Hex SHA-256 of the lower-cased, whitespace-collapsed content.
///
/// Two contents that differ only in case or spacing hash identically.
#[must_use]
pub fn content_hash(content: &str) -> String {
    let normalized = collapse_whitespace(&content.to_lowercase());
    let digest = Sha256::digest(normalized.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Lower-cases, collapses whitespace and caps the key length.
///
/// Returns `None` when nothing is left, so callers can treat an empty key
/// as "no topic".
#[must_use]
pub fn normalize_topic_key(raw: &str) -> Option<String> {
    let normalized = collapse_whitespace(&raw.to_lowercase());
    if normalized.is_empty() {
        return None;
    }
    Some(normalized.chars().take(MAX_TOPIC_KEY_LENGTH).collect())
}

/// Trims an optional string, mapping blank values to `None`.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_simple() {
        let input = "Hello <private>secret</private> world";
        assert_eq!(redact_private(input), "Hello [REDACTED] world");
    }

    #[test]
    fn redact_multiline() {
        let input = "Start\n<private>\nSecret data\n</private>\nEnd";
        assert_eq!(redact_private(input), "Start\n[REDACTED]\nEnd");
    }

    #[test]
    fn redact_case_insensitive() {
        let input = "Hello <PRIVATE>secret</Private> world";
        assert_eq!(redact_private(input), "Hello [REDACTED] world");
    }

    #[test]
    fn redact_multiple_tags_non_greedy() {
        let input = "A <private>x</private> B <private>y</private> C";
        assert_eq!(redact_private(input), "A [REDACTED] B [REDACTED] C");
    }

    #[test]
    fn redact_trims_result() {
        assert_eq!(redact_private("  <private>key=abc</private>  "), "[REDACTED]");
    }

    #[test]
    fn redact_no_tags() {
        assert_eq!(redact_private("No private content here"), "No private content here");
    }

    #[test]
    fn truncate_short_text_untouched() {
        assert_eq!(truncate_content("short", 10), "short");
        assert_eq!(truncate_content("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn truncate_long_text_appends_marker() {
        let out = truncate_content("abcdefghijkl", 5);
        assert_eq!(out, format!("abcde{TRUNCATION_MARKER}"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let out = truncate_content("ñññññ", 2);
        assert_eq!(out, format!("ññ{TRUNCATION_MARKER}"));
    }

    #[test]
    fn hash_ignores_case_and_spacing() {
        assert_eq!(content_hash("Use  WAL\nmode"), content_hash("use wal mode"));
        assert_ne!(content_hash("use wal mode"), content_hash("use rollback journal"));
        assert_eq!(content_hash("x").len(), 64);
    }

    #[test]
    fn hash_is_lowercase_hex_sha256() {
        assert_eq!(
            content_hash("  ABC "),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn topic_key_normalization() {
        assert_eq!(
            normalize_topic_key("  Architecture/Auth   Model "),
            Some("architecture/auth model".to_owned())
        );
        assert_eq!(normalize_topic_key("   "), None);
        let long = "k".repeat(500);
        assert_eq!(normalize_topic_key(&long).map(|k| k.len()), Some(MAX_TOPIC_KEY_LENGTH));
    }

    #[test]
    fn non_blank_filters_whitespace() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" bash ")), Some("bash".to_owned()));
    }
}
