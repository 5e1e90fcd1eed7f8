//! Topic-key suggestion for living documents.

/// Maximum slug length (in chars) of a suggested key.
const MAX_SLUG_LENGTH: usize = 60;

/// Words taken from content when the title yields no slug.
const CONTENT_SLUG_WORDS: usize = 8;

/// Maps an observation type onto a key family.
fn topic_family(observation_type: &str) -> &'static str {
    match observation_type.trim().to_lowercase().as_str() {
        "architecture" | "decision" | "design" => "architecture",
        "bugfix" | "bug" | "fix" => "bug",
        "pattern" | "convention" => "pattern",
        "config" | "configuration" | "setup" => "config",
        "discovery" | "learning" | "passive" => "discovery",
        "progress" | "status" | "session_summary" => "progress",
        "preference" => "preference",
        _ => "topic",
    }
}

/// Lower-case ASCII-alphanumeric slug with single dashes.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    let capped: String = slug.chars().take(MAX_SLUG_LENGTH).collect();
    capped.trim_end_matches('-').to_owned()
}

/// Suggests a stable `family/slug` topic key for an observation.
///
/// The family comes from the type, the slug from the title, falling back
/// to the first words of the content.
#[must_use]
pub fn suggest_topic_key(observation_type: &str, title: &str, content: &str) -> String {
    let family = topic_family(observation_type);
    let mut slug = slugify(title);
    if slug.is_empty() {
        let head = content.split_whitespace().take(CONTENT_SLUG_WORDS).collect::<Vec<_>>();
        slug = slugify(&head.join(" "));
    }
    if slug.is_empty() {
        slug = "general".to_owned();
    }
    format!("{family}/{slug}")
}
