//! Heuristic extraction of "key learnings" sections from free text.
//!
//! Agents often end a turn with a markdown section such as
//! `## Key Learnings:` followed by a list. Only the most recent section that
//! yields at least one usable item is taken; sections are never merged.

use std::sync::LazyLock;

use regex::Regex;

use super::collapse_whitespace;
use crate::constants::MIN_LEARNING_LENGTH;

/// Level 2-3 heading naming a learnings section (English and Spanish variants).
#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static LEARNINGS_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^#{2,3}[ \t]+(?:key[ \t]+learnings?|learnings?|key[ \t]+takeaways?|takeaways?|lessons[ \t]+learned|aprendizajes(?:[ \t]+clave)?|lecciones[ \t]+aprendidas)[ \t]*:?[ \t]*\r?$",
    )
    .unwrap()
});

/// Any level 1-3 heading; ends a section body.
#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static NEXT_HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,3}[ \t]").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static NUMBERED_ITEM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d+[.)][ \t]+(.+)$").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static BULLET_ITEM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-*][ \t]+(.+)$").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static BOLD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static ITALIC_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static INLINE_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Strips bold, italic and inline-code markers and collapses whitespace.
#[must_use]
pub fn clean_markdown(text: &str) -> String {
    let text = BOLD_REGEX.replace_all(text, "${1}${2}");
    let text = ITALIC_REGEX.replace_all(&text, "${1}");
    let text = INLINE_CODE_REGEX.replace_all(&text, "${1}");
    collapse_whitespace(&text)
}

/// Cleaned list items of `body` matched by `item_regex` that meet the length floor.
fn qualifying_items(body: &str, item_regex: &Regex) -> Vec<String> {
    item_regex
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| clean_markdown(m.as_str()))
        .filter(|item| item.chars().count() >= MIN_LEARNING_LENGTH)
        .collect()
}

/// Extracts learning statements from the last usable learnings section.
///
/// Numbered items win over bullets within a section. Returns an empty list
/// when no section header is present or no item survives cleanup.
#[must_use]
pub fn extract_learnings(text: &str) -> Vec<String> {
    let headers: Vec<_> = LEARNINGS_HEADER_REGEX.find_iter(text).collect();
    for header in headers.iter().rev() {
        let rest = &text[header.end()..];
        let body = NEXT_HEADING_REGEX.find(rest).map_or(rest, |next| &rest[..next.start()]);

        let numbered = qualifying_items(body, &NUMBERED_ITEM_REGEX);
        if !numbered.is_empty() {
            return numbered;
        }
        let bullets = qualifying_items(body, &BULLET_ITEM_REGEX);
        if !bullets.is_empty() {
            return bullets;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_ITEM: &str =
        "SQLite FTS5 external content tables need triggers to stay in sync with the base";

    #[test]
    fn filters_short_items_and_strips_markdown() {
        let text = format!("## Key Learnings:\n1. **{LONG_ITEM}**\n2. ok");
        assert_eq!(extract_learnings(&text), vec![LONG_ITEM.to_owned()]);
    }

    #[test]
    fn no_header_returns_empty() {
        assert!(extract_learnings("1. a numbered item that is long enough to count").is_empty());
        assert!(extract_learnings("").is_empty());
    }

    #[test]
    fn level_one_and_four_headers_are_ignored() {
        let text = "# Key Learnings\n1. this item would qualify on length alone\n";
        assert!(extract_learnings(text).is_empty());
        let text = "#### Key Learnings\n1. this item would qualify on length alone\n";
        assert!(extract_learnings(text).is_empty());
    }

    #[test]
    fn body_stops_at_next_heading() {
        let text = "### Learnings\n- the first bullet is long enough to be kept\n## Next steps\n- this bullet belongs to another section entirely";
        assert_eq!(
            extract_learnings(text),
            vec!["the first bullet is long enough to be kept".to_owned()]
        );
    }

    #[test]
    fn numbered_items_win_over_bullets() {
        let text = "## Key Learnings\n- bullet item that is certainly long enough\n1) numbered item that is certainly long enough\n";
        assert_eq!(
            extract_learnings(text),
            vec!["numbered item that is certainly long enough".to_owned()]
        );
    }

    #[test]
    fn falls_back_to_bullets_when_numbers_too_short() {
        let text = "## Key Learnings\n1. tiny\n* `cargo test` must run with the bundled sqlite feature\n";
        assert_eq!(
            extract_learnings(text),
            vec!["cargo test must run with the bundled sqlite feature".to_owned()]
        );
    }

    #[test]
    fn prefers_most_recent_section() {
        let text = "## Key Learnings\n1. the older section item is long enough to keep\n\nsome prose\n\n## Key Learnings\n1. the newer section item is long enough to keep\n";
        assert_eq!(
            extract_learnings(text),
            vec!["the newer section item is long enough to keep".to_owned()]
        );
    }

    #[test]
    fn earlier_section_used_when_latest_yields_nothing() {
        let text = "## Learnings\n1. the older section item is long enough to keep\n## Learnings\n1. nope\n";
        assert_eq!(
            extract_learnings(text),
            vec!["the older section item is long enough to keep".to_owned()]
        );
    }

    #[test]
    fn spanish_header_variant() {
        let text = "## Aprendizajes Clave:\n1. las transacciones deben ser inmediatas siempre\n";
        assert_eq!(
            extract_learnings(text),
            vec!["las transacciones deben ser inmediatas siempre".to_owned()]
        );
    }

    #[test]
    fn clean_markdown_handles_italic_and_code() {
        assert_eq!(clean_markdown("use *WAL*   mode via `PRAGMA`"), "use WAL mode via PRAGMA");
        assert_eq!(clean_markdown("__bold__ text"), "bold text");
    }
}
