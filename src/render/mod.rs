//! Page renderers.

pub mod html;
pub mod table;

use crate::ports::annotations::{get_ignore_case, Annotations};

/// Message shown when a store holds no builds.
pub const EMPTY_MESSAGE: &str = "No builds found.";

/// Characters of a commit hash shown in the developer view.
const COMMIT_PREFIX_LEN: usize = 8;

/// Keys given dedicated treatment in [`describe_annotations`].
const KNOWN_KEYS: [&str; 5] = ["commit", "branch", "author", "message", "sprint"];

/// One-line summary of a build's annotations for the developer view.
///
/// Renders as `<commit> (<branch>, <author>) <message>` followed by any
/// other keys as `key=value`, in key order.
#[must_use]
pub fn describe_annotations(annotations: &Annotations) -> String {
    let mut parts = Vec::new();

    let commit = get_ignore_case(annotations, "commit")
        .map(|c| c.trim().chars().take(COMMIT_PREFIX_LEN).collect::<String>());
    let who: Vec<&str> = ["branch", "author"]
        .iter()
        .filter_map(|k| get_ignore_case(annotations, k))
        .collect();
    match (commit, who.is_empty()) {
        (Some(commit), false) => parts.push(format!("{commit} ({})", who.join(", "))),
        (Some(commit), true) => parts.push(commit),
        (None, false) => parts.push(format!("({})", who.join(", "))),
        (None, true) => {}
    }
    if let Some(message) = get_ignore_case(annotations, "message") {
        parts.push(message.lines().next().unwrap_or_default().trim().to_string());
    }
    if let Some(sprint) = get_ignore_case(annotations, "sprint") {
        parts.push(format!("sprint={sprint}"));
    }
    for (key, value) in annotations {
        if !KNOWN_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            parts.push(format!("{key}={value}"));
        }
    }
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}
