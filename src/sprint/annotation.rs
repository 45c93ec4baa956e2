//! Sprint labels taken from a build's own annotations.
//!
//! A build uploaded with a `sprint` annotation (`"12"`, `"Sprint 8b"`,
//! `"sprint-8B"`) is labelled from that annotation instead of its
//! position. Values that do not look like a sprint number are shown
//! truncated rather than discarded.

use std::sync::LazyLock;

use regex::Regex;

use super::resolve::SprintLabel;

/// Annotation key naming a build's sprint.
pub const SPRINT_KEY: &str = "sprint";

/// Characters kept from an annotation that is not a sprint number.
pub const DEGRADED_LABEL_LEN: usize = 12;

/// Label for a build carrying a sprint annotation.
#[must_use]
pub fn label_from_annotation(value: &str) -> SprintLabel {
    let value = value.trim();
    match parse_sprint_token(value) {
        Some(label) => SprintLabel::Text(label),
        None => SprintLabel::Text(value.chars().take(DEGRADED_LABEL_LEN).collect()),
    }
}

/// `[sprint][ _-]*<digits>[letter]`, matched case-insensitively.
static SPRINT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:sprint[ _-]*)?([0-9]+)((?-i:[A-Za-z]))?$")
        .expect("sprint token regex is valid")
});

/// Returns `<digits>` followed by the upper-cased letter, if `value` is a
/// sprint token.
fn parse_sprint_token(value: &str) -> Option<String> {
    let captures = SPRINT_TOKEN.captures(value)?;
    let digits = captures.get(1)?.as_str();
    let letter = captures.get(2).map(|m| m.as_str().to_ascii_uppercase()).unwrap_or_default();
    Some(format!("{digits}{letter}"))
}
