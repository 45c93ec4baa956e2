//! HTML listing page.

use std::fmt::Write as _;

use crate::config::ViewMode;
use crate::listing::{Listing, ListingEntry};

use super::{describe_annotations, EMPTY_MESSAGE};

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
table{border-collapse:collapse}\
th,td{padding:.3em .8em;text-align:left;border-bottom:1px solid #ddd}\
tr.latest{font-weight:bold}\
.badge{font-size:.8em;background:#2a7;color:#fff;border-radius:3px;padding:0 .4em;margin-left:.5em}\
.empty{color:#777}\
footer{margin-top:2em;color:#777;font-size:.8em}";

/// Renders a complete HTML document for `listing`.
#[must_use]
pub fn render_page(listing: &Listing, title: &str) -> String {
    let title = escape(title);
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{title}</title>");
    let _ = writeln!(out, "<style>{STYLE}</style>");
    out.push_str("</head>\n<body>\n");
    let _ = writeln!(out, "<h1>{title}</h1>");

    if listing.is_empty() {
        let _ = writeln!(out, "<p class=\"empty\">{EMPTY_MESSAGE}</p>");
    } else {
        out.push_str("<table>\n<thead><tr>");
        let headers: &[&str] = match listing.mode {
            ViewMode::Qa => &["Sprint", "Build", "Uploaded"],
            ViewMode::Dev => &["Build", "Revision", "Uploaded", "Commit"],
        };
        for header in headers {
            let _ = write!(out, "<th>{header}</th>");
        }
        out.push_str("</tr></thead>\n<tbody>\n");
        for entry in &listing.entries {
            render_row(&mut out, listing.mode, entry);
        }
        out.push_str("</tbody>\n</table>\n");
    }

    let _ = writeln!(
        out,
        "<footer>Generated {}</footer>",
        listing.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    out.push_str("</body>\n</html>\n");
    out
}

fn render_row(out: &mut String, mode: ViewMode, entry: &ListingEntry) {
    let class = if entry.is_latest { " class=\"latest\"" } else { "" };
    let badge = if entry.is_latest { "<span class=\"badge\">latest</span>" } else { "" };
    let link = format!(
        "<a href=\"{}\">{}</a>{badge}",
        escape(&entry.link),
        escape(&entry.name)
    );
    let label = escape(&entry.label.to_string());
    let uploaded = entry.build.modified_at.format("%Y-%m-%d %H:%M");

    let _ = write!(out, "<tr{class}>");
    match mode {
        ViewMode::Qa => {
            let _ = write!(out, "<td>{label}</td><td>{link}</td><td>{uploaded}</td>");
        }
        ViewMode::Dev => {
            let notes = escape(&describe_annotations(&entry.annotations));
            let _ = write!(
                out,
                "<td>{link}</td><td><code>{label}</code></td><td>{uploaded}</td><td>{notes}</td>"
            );
        }
    }
    out.push_str("</tr>\n");
}

/// Escapes text for use in HTML content and double-quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::Build;
    use crate::listing::ListingEntry;
    use crate::ports::annotations::Annotations;
    use crate::sprint::SprintLabel;
    use chrono::{TimeZone, Utc};

    fn entry(name: &str, label: SprintLabel, latest: bool) -> ListingEntry {
        let mut annotations = Annotations::new();
        annotations.insert("commit".into(), "0123456789abcdef".into());
        annotations.insert("message".into(), "Fix <script> & stuff".into());
        ListingEntry {
            build: Build::new(
                format!("builds/{name}"),
                Some("r1".into()),
                Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
            ),
            name: name.to_string(),
            label,
            raw_index: None,
            is_latest: latest,
            link: format!("https://dl.example.com/builds/{name}?a=1&b=2"),
            annotations,
        }
    }

    fn listing(mode: ViewMode, entries: Vec<ListingEntry>) -> Listing {
        Listing { mode, entries, generated_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap() }
    }

    #[test]
    fn empty_listing_renders_empty_state() {
        let html = render_page(&listing(ViewMode::Qa, Vec::new()), "QA builds");
        assert!(html.contains("<p class=\"empty\">No builds found.</p>"));
        assert!(!html.contains("<table>"));
        assert!(html.contains("<title>QA builds</title>"));
        assert!(html.contains("Generated 2024-06-01 08:00 UTC"));
    }

    #[test]
    fn qa_rows_show_sprint_and_latest_badge() {
        let html = render_page(
            &listing(
                ViewMode::Qa,
                vec![
                    entry("app-2.apk", SprintLabel::Text("8B".into()), true),
                    entry("app-1.apk", SprintLabel::Hidden, false),
                ],
            ),
            "Builds",
        );
        assert!(html.contains("<tr class=\"latest\"><td>8B</td>"));
        assert!(html.contains("app-2.apk</a><span class=\"badge\">latest</span>"));
        assert!(html.contains("<tr><td>-</td>"));
        assert!(html.contains("href=\"https://dl.example.com/builds/app-1.apk?a=1&amp;b=2\""));
        assert!(html.contains("<th>Sprint</th>"));
        assert!(!html.contains("Commit"));
        assert!(html.find("app-2.apk").unwrap() < html.find("app-1.apk").unwrap());
    }

    #[test]
    fn dev_rows_show_revision_and_escaped_commit_notes() {
        let html = render_page(
            &listing(ViewMode::Dev, vec![entry("app.apk", SprintLabel::Text("r1".into()), true)]),
            "<Dev>",
        );
        assert!(html.contains("<h1>&lt;Dev&gt;</h1>"));
        assert!(html.contains("<td><code>r1</code></td>"));
        assert!(html.contains("01234567 Fix &lt;script&gt; &amp; stuff"));
        assert!(html.contains("<td>2024-05-02 09:30</td>"));
    }

    #[test]
    fn escape_handles_quotes() {
        assert_eq!(escape(r#"a"b'c"#), "a&quot;b&#39;c");
    }
}
