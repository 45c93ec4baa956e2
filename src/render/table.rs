//! Plain-text table for terminals.

use std::fmt::Write as _;

use crate::config::ViewMode;
use crate::listing::Listing;

use super::{describe_annotations, EMPTY_MESSAGE};

/// Renders `listing` as an aligned text table.
#[must_use]
pub fn render_table(listing: &Listing) -> String {
    if listing.is_empty() {
        return format!("{EMPTY_MESSAGE}\n");
    }

    let label_header = match listing.mode {
        ViewMode::Qa => "SPRINT",
        ViewMode::Dev => "REVISION",
    };

    // Collect rows for column-width calculation.
    let rows: Vec<(String, String, String, String)> = listing
        .entries
        .iter()
        .map(|e| {
            let name = if e.is_latest { format!("{} *", e.name) } else { e.name.clone() };
            (
                e.label.to_string(),
                name,
                e.build.modified_at.format("%Y-%m-%d %H:%M").to_string(),
                describe_annotations(&e.annotations),
            )
        })
        .collect();

    let label_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max(label_header.len());
    let name_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(5).max(5);
    let time_width = 16;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{label_header:<label_width$}  {:<name_width$}  {:<time_width$}  NOTES",
        "BUILD", "UPLOADED",
    );
    let _ = writeln!(out, "{:-<label_width$}  {:-<name_width$}  {:-<time_width$}  -----", "", "", "");
    for (label, name, time, notes) in &rows {
        let line = format!("{label:<label_width$}  {name:<name_width$}  {time:<time_width$}  {notes}");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    let _ = writeln!(out, "\n{} build(s), * = latest.", rows.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::Build;
    use crate::listing::ListingEntry;
    use crate::ports::annotations::Annotations;
    use crate::sprint::SprintLabel;
    use chrono::{TimeZone, Utc};

    #[test]
    fn empty_listing_prints_message() {
        let listing = Listing { mode: ViewMode::Dev, entries: Vec::new(), generated_at: Utc::now() };
        assert_eq!(render_table(&listing), "No builds found.\n");
    }

    #[test]
    fn rows_are_aligned_and_latest_marked() {
        let make = |name: &str, label: &str, latest: bool| ListingEntry {
            build: Build::new(name, None, Utc.with_ymd_and_hms(2024, 5, 1, 7, 5, 0).unwrap()),
            name: name.to_string(),
            label: SprintLabel::Text(label.into()),
            raw_index: None,
            is_latest: latest,
            link: String::new(),
            annotations: Annotations::new(),
        };
        let listing = Listing {
            mode: ViewMode::Qa,
            entries: vec![make("app-long-name.apk", "10", true), make("a.apk", "9", false)],
            generated_at: Utc::now(),
        };
        let table = render_table(&listing);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "SPRINT  BUILD                UPLOADED          NOTES");
        assert_eq!(lines[2], "10      app-long-name.apk *  2024-05-01 07:05");
        assert_eq!(lines[3], "9       a.apk                2024-05-01 07:05");
        assert!(table.ends_with("2 build(s), * = latest.\n"));
    }
}
