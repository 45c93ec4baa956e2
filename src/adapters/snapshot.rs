//! Listing snapshots: a store's builds and annotations captured to YAML.
//!
//! `buildlist snapshot` records whatever store is configured; pointing
//! `BUILDS_STORAGE` at the resulting file (`snapshot:<path>` or any
//! `.yaml` path) replays it. Handy for reproducing a QA page exactly or
//! for rendering without access to the real storage.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::build::Build;
use crate::error::PortError;
use crate::ports::annotations::{AnnotationSource, Annotations};
use crate::ports::store::BuildStore;
use crate::ports::PortFuture;

/// One captured build with its annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// The build record.
    #[serde(flatten)]
    pub build: Build,
    /// Annotations fetched at capture time.
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

/// A captured listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Storage location the snapshot was taken from.
    pub source: String,
    /// When it was taken.
    pub recorded_at: DateTime<Utc>,
    /// Captured builds in enumeration order.
    #[serde(default)]
    pub entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    /// Captures every build of `store` together with its annotations.
    ///
    /// Annotation failures are recorded as "no annotations", matching how
    /// the page treats them.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    pub async fn capture(
        store: &dyn BuildStore,
        annotations: &dyn AnnotationSource,
        source: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, PortError> {
        let builds = store.list_builds().await?;
        let mut entries = Vec::with_capacity(builds.len());
        for build in builds {
            let found = annotations
                .fetch_annotations(&build.identity, build.revision.as_deref())
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(identity = %build.identity, error = %e, "annotations unavailable");
                    Annotations::new()
                });
            entries.push(SnapshotEntry { build, annotations: found });
        }
        Ok(Self { source: source.into(), recorded_at, entries })
    }

    /// Reads a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, PortError> {
        let content = std::fs::read_to_string(path).map_err(|e| PortError::io(path, e))?;
        serde_yaml::from_str(&content)
            .map_err(|e| PortError::parse(format!("snapshot {}", path.display()), e))
    }

    /// Writes the snapshot as YAML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write(&self, path: &Path) -> Result<(), PortError> {
        let yaml = serde_yaml::to_string(self).map_err(|e| PortError::parse("snapshot", e))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PortError::io(parent, e))?;
        }
        std::fs::write(path, yaml).map_err(|e| PortError::io(path, e))
    }
}

/// Store replaying a [`Snapshot`].
pub struct SnapshotStore {
    snapshot: Snapshot,
}

impl SnapshotStore {
    /// Wraps a loaded snapshot.
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Loads a snapshot file into a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self, PortError> {
        Snapshot::load(path).map(Self::new)
    }

    /// The replayed snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl BuildStore for SnapshotStore {
    fn list_builds(&self) -> PortFuture<'_, Vec<Build>> {
        Box::pin(async move {
            Ok(self.snapshot.entries.iter().map(|e| e.build.clone()).collect())
        })
    }
}

impl AnnotationSource for SnapshotStore {
    fn fetch_annotations<'a>(
        &'a self,
        identity: &'a str,
        revision: Option<&'a str>,
    ) -> PortFuture<'a, Annotations> {
        Box::pin(async move {
            Ok(self
                .snapshot
                .entries
                .iter()
                .find(|e| e.build.identity == identity && e.build.revision.as_deref() == revision)
                .map(|e| e.annotations.clone())
                .unwrap_or_default())
        })
    }
}
