//! Operator-supplied sprint label overrides.
//!
//! Configured as `index:label,index:label,...`, e.g. `8:8A,9:8B` when the
//! work of sprint 8 shipped as two releases.

use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Mapping from raw sprint index to a replacement label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideMap {
    entries: BTreeMap<i64, String>,
}

impl OverrideMap {
    /// Parses an override string, dropping malformed entries.
    ///
    /// Entries without a `:`, with a non-numeric index or with an empty
    /// label are skipped with a warning. A repeated index keeps its first
    /// label. Empty segments (e.g. a trailing comma) are ignored silently.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut entries = BTreeMap::new();
        for segment in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let Some((key, label)) = segment.split_once(':') else {
                tracing::warn!(entry = segment, "dropping sprint override without ':'");
                continue;
            };
            let Ok(index) = key.trim().parse::<i64>() else {
                tracing::warn!(entry = segment, "dropping sprint override with non-numeric index");
                continue;
            };
            let label = label.trim();
            if label.is_empty() {
                tracing::warn!(entry = segment, "dropping sprint override with empty label");
                continue;
            }
            if entries.contains_key(&index) {
                tracing::warn!(index, label, "ignoring repeated sprint override index");
                continue;
            }
            entries.insert(index, label.to_string());
        }
        Self { entries }
    }

    /// Builds a map from already-validated pairs. Later duplicates win.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self { entries: entries.into_iter().map(|(k, v)| (k, v.into())).collect() }
    }

    /// Number of overridden indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no index is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The override label for `index`, if any.
    #[must_use]
    pub fn get(&self, index: i64) -> Option<&str> {
        self.entries.get(&index).map(String::as_str)
    }

    /// Lowest and highest overridden index.
    #[must_use]
    pub fn bounds(&self) -> Option<(i64, i64)> {
        let min = *self.entries.keys().next()?;
        let max = *self.entries.keys().next_back()?;
        Some((min, max))
    }

    /// First index of every run of consecutive keys, ascending.
    #[must_use]
    pub fn run_starts(&self) -> Vec<i64> {
        let mut starts = Vec::new();
        let mut previous: Option<i64> = None;
        for &key in self.entries.keys() {
            if previous.map_or(true, |p| key != p + 1) {
                starts.push(key);
            }
            previous = Some(key);
        }
        starts
    }

    /// Number of distinct split events, one per run of consecutive keys.
    #[must_use]
    pub fn split_events(&self) -> usize {
        self.run_starts().len()
    }

    /// How far indices above every key move down: keys minus split events.
    #[must_use]
    pub fn shift(&self) -> i64 {
        // Both counts are bounded by the number of configured entries.
        i64::try_from(self.len() - self.split_events()).unwrap_or(i64::MAX)
    }

    /// Rejects maps whose keys do not form a single consecutive run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonContiguousOverrides`] listing each run's start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let starts = self.run_starts();
        if starts.len() > 1 {
            return Err(ConfigError::NonContiguousOverrides { starts });
        }
        Ok(())
    }

    /// Iterates `(index, label)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}
