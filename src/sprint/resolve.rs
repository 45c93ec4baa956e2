//! Sprint label resolution.
//!
//! Position in the newest-first list gives every build a raw index
//! (`total - position + offset`), so the oldest build has the lowest index.
//! Overrides then rename indices where one sprint shipped as several
//! releases:
//!
//! - an overridden index takes the override label verbatim;
//! - an index below every override key is left alone;
//! - an index above every override key moves down by
//!   [`OverrideMap::shift`] under [`ShiftPolicy::Absorb`];
//! - an index between override keys that is not itself overridden has no
//!   label at all ([`SprintLabel::Hidden`]).
//!
//! Every build is labelled independently from the same inputs.

use std::collections::BTreeMap;
use std::fmt;

use crate::build::OrderedBuilds;
use crate::error::ConfigError;

use super::overrides::OverrideMap;

/// Length of the revision prefix shown in the developer view.
pub const REVISION_LABEL_LEN: usize = 8;

/// How indices above a split are renumbered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ShiftPolicy {
    /// Subtract the extra indices the split consumed.
    #[default]
    Absorb,
    /// Keep raw numbering above the split.
    Preserve,
}

/// Inputs for QA-view sprint numbering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SprintScheme {
    /// Index renames.
    pub overrides: OverrideMap,
    /// Base added to every raw index.
    pub offset: i64,
    /// Renumbering above the overridden range.
    pub shift: ShiftPolicy,
}

/// Which label every build receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelScheme {
    /// Developer view: a short revision prefix.
    Revision,
    /// QA view: sequential sprint numbers.
    Sprint(SprintScheme),
}

/// Label shown next to a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SprintLabel {
    /// Displayable label (may be empty for unrevisioned builds).
    Text(String),
    /// Index sits in a gap of the override table and is not numbered.
    Hidden,
}

impl SprintLabel {
    /// The label text, if the build is numbered.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Hidden => None,
        }
    }
}

impl fmt::Display for SprintLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Hidden => f.write_str("-"),
        }
    }
}

/// Resolved label and latest flag for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAssignment {
    /// Position-derived index before overrides; `None` in the developer view.
    pub raw_index: Option<i64>,
    /// Final label.
    pub label: SprintLabel,
    /// Whether this is the most recent build.
    pub is_latest: bool,
}

/// Raw sprint index for the build at `position` (0 = newest) of `total`,
/// or `None` if it does not fit in an `i64`.
#[must_use]
pub fn raw_index(total: usize, position: usize, offset: i64) -> Option<i64> {
    let distance = i64::try_from(total.checked_sub(position)?).ok()?;
    distance.checked_add(offset)
}

/// Label for a single raw index.
#[must_use]
pub fn label_for_index(index: i64, scheme: &SprintScheme) -> SprintLabel {
    if let Some(label) = scheme.overrides.get(index) {
        return SprintLabel::Text(label.to_string());
    }
    let Some((min, max)) = scheme.overrides.bounds() else {
        return SprintLabel::Text(index.to_string());
    };
    if index < min {
        SprintLabel::Text(index.to_string())
    } else if index > max {
        let shifted = match scheme.shift {
            ShiftPolicy::Absorb => index.saturating_sub(scheme.overrides.shift()),
            ShiftPolicy::Preserve => index,
        };
        SprintLabel::Text(shifted.to_string())
    } else {
        SprintLabel::Hidden
    }
}

/// Label derived from a revision identifier.
#[must_use]
pub fn revision_label(revision: Option<&str>) -> SprintLabel {
    let prefix = revision.map(|r| r.chars().take(REVISION_LABEL_LEN).collect()).unwrap_or_default();
    SprintLabel::Text(prefix)
}

/// Resolves a label for every build, newest first.
///
/// The first build is flagged latest; labels never influence that flag.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for `SPRINT_OFFSET` if an index of the
/// sprint numbering would overflow.
pub fn resolve(
    builds: &OrderedBuilds,
    scheme: &LabelScheme,
) -> Result<Vec<LabelAssignment>, ConfigError> {
    let total = builds.len();
    builds
        .iter()
        .enumerate()
        .map(|(position, build)| {
            let is_latest = position == 0;
            match scheme {
                LabelScheme::Revision => Ok(LabelAssignment {
                    raw_index: None,
                    label: revision_label(build.revision.as_deref()),
                    is_latest,
                }),
                LabelScheme::Sprint(sprint) => {
                    let index = raw_index(total, position, sprint.offset).ok_or_else(|| {
                        ConfigError::Invalid {
                            key: "SPRINT_OFFSET",
                            value: sprint.offset.to_string(),
                            reason: format!("sprint numbers for {total} builds overflow"),
                        }
                    })?;
                    Ok(LabelAssignment {
                        raw_index: Some(index),
                        label: label_for_index(index, sprint),
                        is_latest,
                    })
                }
            }
        })
        .collect()
}

/// Labels carried by more than one entry, ascending. Hidden and empty
/// labels are not counted.
#[must_use]
pub fn duplicate_labels<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a SprintLabel>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        if let Some(text) = label.as_text().filter(|t| !t.is_empty()) {
            *counts.entry(text).or_default() += 1;
        }
    }
    counts.into_iter().filter(|(_, n)| *n > 1).map(|(text, _)| text.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{order_builds, Build};
    use chrono::{TimeZone, Utc};

    fn builds(count: usize) -> OrderedBuilds {
        let list = (0..count)
            .map(|i| {
                let secs = i64::try_from(i).unwrap() * 3600;
                Build::new(format!("builds/app-{i}.apk"), None, Utc.timestamp_opt(secs, 0).unwrap())
            })
            .collect();
        order_builds(list)
    }

    fn sprint(overrides: &str, offset: i64, shift: ShiftPolicy) -> LabelScheme {
        LabelScheme::Sprint(SprintScheme { overrides: OverrideMap::parse(overrides), offset, shift })
    }

    fn resolved(list: &OrderedBuilds, scheme: &LabelScheme) -> Vec<LabelAssignment> {
        resolve(list, scheme).unwrap()
    }

    fn texts(assignments: &[LabelAssignment]) -> Vec<String> {
        assignments.iter().map(|a| a.label.to_string()).collect()
    }

    #[test]
    fn no_overrides_labels_equal_raw_indices() {
        let assignments = resolved(&builds(5), &sprint("", 0, ShiftPolicy::Absorb));
        assert_eq!(texts(&assignments), ["5", "4", "3", "2", "1"]);
        let raws: Vec<i64> = assignments.iter().filter_map(|a| a.raw_index).collect();
        assert!(raws.windows(2).all(|w| w[0] > w[1]));
        assert!(duplicate_labels(assignments.iter().map(|a| &a.label)).is_empty());
    }

    #[test]
    fn offset_moves_the_base() {
        let assignments = resolved(&builds(3), &sprint("", 10, ShiftPolicy::Absorb));
        assert_eq!(texts(&assignments), ["13", "12", "11"]);
    }

    #[test]
    fn ten_builds_split_sprint_preserve() {
        let assignments = resolved(&builds(10), &sprint("8:8A,9:8B", 1, ShiftPolicy::Preserve));
        assert_eq!(
            texts(&assignments),
            ["11", "10", "8B", "8A", "7", "6", "5", "4", "3", "2"]
        );
        assert!(assignments[0].is_latest);
        assert_eq!(assignments[0].raw_index, Some(11));
        assert_eq!(assignments.iter().filter(|a| a.is_latest).count(), 1);
    }

    #[test]
    fn ten_builds_split_sprint_absorb() {
        let assignments = resolved(&builds(10), &sprint("8:8A,9:8B", 1, ShiftPolicy::Absorb));
        assert_eq!(
            texts(&assignments),
            ["10", "9", "8B", "8A", "7", "6", "5", "4", "3", "2"]
        );
        assert!(duplicate_labels(assignments.iter().map(|a| &a.label)).is_empty());
    }

    #[test]
    fn k_way_split_replaces_k_labels_and_shifts_above() {
        let scheme = sprint("4:4A,5:4B,6:4C", 0, ShiftPolicy::Absorb);
        let plain = resolved(&builds(9), &sprint("", 0, ShiftPolicy::Absorb));
        let split = resolved(&builds(9), &scheme);

        let replaced = plain.iter().zip(&split).filter(|(p, s)| p.label != s.label).count();
        // three override labels plus the three shifted indices 7, 8, 9
        assert_eq!(replaced, 6);
        for (p, s) in plain.iter().zip(&split) {
            let raw = p.raw_index.unwrap();
            if raw > 6 {
                assert_eq!(s.label, SprintLabel::Text((raw - 2).to_string()));
            } else if raw < 4 {
                assert_eq!(s.label, p.label);
            }
        }
        assert!(duplicate_labels(split.iter().map(|a| &a.label)).is_empty());
    }

    #[test]
    fn history_below_overrides_is_untouched() {
        let scheme = SprintScheme {
            overrides: OverrideMap::parse("8:8A,9:8B"),
            offset: 0,
            shift: ShiftPolicy::Absorb,
        };
        for index in -3..8 {
            assert_eq!(label_for_index(index, &scheme), SprintLabel::Text(index.to_string()));
        }
    }

    #[test]
    fn gap_between_override_keys_is_hidden() {
        let scheme = SprintScheme {
            overrides: OverrideMap::from_entries([(5, "5A"), (6, "5B"), (9, "8A")]),
            offset: 0,
            shift: ShiftPolicy::Absorb,
        };
        assert_eq!(label_for_index(7, &scheme), SprintLabel::Hidden);
        assert_eq!(label_for_index(8, &scheme), SprintLabel::Hidden);
        // two runs: shift is three keys minus two split events
        assert_eq!(label_for_index(10, &scheme), SprintLabel::Text("9".into()));
        assert_eq!(SprintLabel::Hidden.to_string(), "-");
    }

    #[test]
    fn resolution_is_idempotent() {
        let list = builds(7);
        let scheme = sprint("3:3A,4:3B", 2, ShiftPolicy::Absorb);
        assert_eq!(resolved(&list, &scheme), resolved(&list, &scheme));
    }

    #[test]
    fn empty_input_yields_no_assignments() {
        let assignments = resolved(&builds(0), &sprint("8:8A", 1, ShiftPolicy::Absorb));
        assert!(assignments.is_empty());
    }

    #[test]
    fn latest_flag_ignores_overrides() {
        let assignments = resolved(&builds(4), &sprint("4:first", 0, ShiftPolicy::Absorb));
        assert_eq!(assignments[0].label, SprintLabel::Text("first".into()));
        assert!(assignments[0].is_latest);
        assert!(assignments[1..].iter().all(|a| !a.is_latest));
    }

    #[test]
    fn revision_mode_uses_short_prefix() {
        let list = order_builds(vec![
            Build::new("a.apk", Some("3f9c2b1e77aa".into()), Utc.timestamp_opt(20, 0).unwrap()),
            Build::new("a.apk", Some("abc".into()), Utc.timestamp_opt(10, 0).unwrap()),
            Build::new("b.apk", None, Utc.timestamp_opt(5, 0).unwrap()),
        ]);
        let assignments = resolved(&list, &LabelScheme::Revision);
        assert_eq!(texts(&assignments), ["3f9c2b1e", "abc", ""]);
        assert!(assignments.iter().all(|a| a.raw_index.is_none()));
        assert!(assignments[0].is_latest);
    }

    #[test]
    fn colliding_override_label_is_reported() {
        let assignments = resolved(&builds(5), &sprint("5:3", 0, ShiftPolicy::Absorb));
        let dups = duplicate_labels(assignments.iter().map(|a| &a.label));
        assert_eq!(dups, ["3"]);
    }

    #[test]
    fn offset_at_the_edge_of_i64_still_resolves() {
        let assignments = resolved(&builds(2), &sprint("", i64::MAX - 2, ShiftPolicy::Absorb));
        assert_eq!(assignments[0].raw_index, Some(i64::MAX));
        assert_eq!(assignments[1].raw_index, Some(i64::MAX - 1));

        let low = resolved(&builds(2), &sprint("", i64::MIN, ShiftPolicy::Absorb));
        assert_eq!(low[1].raw_index, Some(i64::MIN + 1));
    }

    #[test]
    fn overflowing_offset_is_a_configuration_error() {
        let err = resolve(&builds(2), &sprint("", i64::MAX, ShiftPolicy::Absorb)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SPRINT_OFFSET", .. }));
        assert!(err.to_string().contains("9223372036854775807"));

        // developer view ignores the offset entirely
        assert!(resolve(&builds(2), &LabelScheme::Revision).is_ok());
        let none = resolve(&builds(0), &sprint("", i64::MAX, ShiftPolicy::Absorb)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn raw_index_reports_overflow() {
        assert_eq!(raw_index(10, 0, 1), Some(11));
        assert_eq!(raw_index(10, 9, 1), Some(2));
        assert_eq!(raw_index(1, 0, i64::MAX), None);
    }
}
