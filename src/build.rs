//! Build records and recency ordering.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One discoverable artifact revision in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    /// Key naming the logical artifact, usually a `/`-separated path.
    pub identity: String,
    /// Distinguishes this upload from earlier ones under the same identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// Creation or last-write time.
    pub modified_at: DateTime<Utc>,
}

impl Build {
    /// Creates a build record.
    pub fn new(
        identity: impl Into<String>,
        revision: Option<String>,
        modified_at: DateTime<Utc>,
    ) -> Self {
        Self { identity: identity.into(), revision, modified_at }
    }

    /// The identity with any path prefix and trailing `/` stripped. An
    /// identity with no named segment is shown whole.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.identity
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.identity)
    }

    /// Newest-first ordering with identity then revision as tie-breakers.
    fn recency_cmp(&self, other: &Self) -> Ordering {
        other
            .modified_at
            .cmp(&self.modified_at)
            .then_with(|| self.identity.cmp(&other.identity))
            .then_with(|| self.revision.cmp(&other.revision))
    }
}

/// Builds sorted newest first.
///
/// The order is total: equal timestamps fall back to identity and then
/// revision, so the same input always produces the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedBuilds {
    builds: Vec<Build>,
}

impl OrderedBuilds {
    /// Number of builds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.builds.len()
    }

    /// Returns `true` when there are no builds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    /// Iterates newest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Build> {
        self.builds.iter()
    }

    /// The most recent build, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&Build> {
        self.builds.first()
    }

    /// Consumes the list, yielding builds newest first.
    #[must_use]
    pub fn into_vec(self) -> Vec<Build> {
        self.builds
    }
}

impl<'a> IntoIterator for &'a OrderedBuilds {
    type Item = &'a Build;
    type IntoIter = std::slice::Iter<'a, Build>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sorts an unordered enumeration into an [`OrderedBuilds`].
#[must_use]
pub fn order_builds(mut builds: Vec<Build>) -> OrderedBuilds {
    builds.sort_by(Build::recency_cmp);
    OrderedBuilds { builds }
}
