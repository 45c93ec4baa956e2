//! Build store backed by a local directory tree.
//!
//! Layout:
//!
//! ```text
//! <root>/
//!   ├── android/app.apk              current upload
//!   ├── android/app.apk.meta.json    its annotations
//!   └── .revisions/
//!       └── android/app.apk/
//!           ├── 1f0c…                earlier upload, named by revision
//!           └── 1f0c….meta.json
//! ```
//!
//! Current files get a content-derived revision so the developer view can
//! tell uploads apart. Dot-entries outside `.revisions` are ignored.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::build::Build;
use crate::error::PortError;
use crate::ports::annotations::{AnnotationSource, Annotations};
use crate::ports::store::BuildStore;
use crate::ports::PortFuture;

/// Directory holding earlier revisions, relative to the root.
pub const REVISIONS_DIR: &str = ".revisions";

/// Suffix of annotation sidecar files.
pub const META_SUFFIX: &str = ".meta.json";

/// Hex characters of the content digest used as a revision.
const REVISION_HEX_LEN: usize = 16;

/// Build store reading a directory tree.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scan(&self) -> Result<Vec<Build>, PortError> {
        if !self.root.is_dir() {
            return Err(PortError::io(
                &self.root,
                io::Error::new(io::ErrorKind::NotFound, "storage directory does not exist"),
            ));
        }

        let mut builds = Vec::new();

        let current = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_dot_entry(e.path()));
        for entry in current {
            let entry = entry.map_err(|e| walk_error(&self.root, e))?;
            if !entry.file_type().is_file() || is_sidecar(entry.path()) {
                continue;
            }
            let Some(identity) = relative_identity(&self.root, entry.path()) else {
                continue;
            };
            let revision = content_revision(entry.path())?;
            builds.push(Build::new(identity, Some(revision), modified_at(entry.path())?));
        }

        let history = self.root.join(REVISIONS_DIR);
        if history.is_dir() {
            for entry in WalkDir::new(&history).min_depth(2).sort_by_file_name() {
                let entry = entry.map_err(|e| walk_error(&history, e))?;
                if !entry.file_type().is_file() || is_sidecar(entry.path()) {
                    continue;
                }
                let (Some(parent), Some(name)) = (entry.path().parent(), entry.path().file_name())
                else {
                    continue;
                };
                let Some(identity) = relative_identity(&history, parent) else {
                    continue;
                };
                let revision = name.to_string_lossy().into_owned();
                builds.push(Build::new(identity, Some(revision), modified_at(entry.path())?));
            }
        }

        tracing::debug!(root = %self.root.display(), count = builds.len(), "scanned build directory");
        Ok(builds)
    }

    fn sidecar_for(&self, identity: &str, revision: Option<&str>) -> Result<PathBuf, PortError> {
        let relative = safe_relative(identity).ok_or_else(|| {
            PortError::parse("build identity", format!("{identity:?} escapes the storage root"))
        })?;
        if let Some(revision) = revision.filter(|r| safe_relative(r).is_some()) {
            let archived = self.root.join(REVISIONS_DIR).join(&relative).join(revision);
            if archived.is_file() {
                return Ok(with_meta_suffix(&archived));
            }
        }
        Ok(with_meta_suffix(&self.root.join(relative)))
    }

    fn read_annotations(&self, identity: &str, revision: Option<&str>) -> Result<Annotations, PortError> {
        let path = self.sidecar_for(identity, revision)?;
        if !path.is_file() {
            return Ok(Annotations::new());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| PortError::io(&path, e))?;
        parse_annotations(&content).map_err(|e| PortError::parse(path.display().to_string(), e))
    }
}

impl BuildStore for DirectoryStore {
    fn list_builds(&self) -> PortFuture<'_, Vec<Build>> {
        Box::pin(async move { self.scan() })
    }
}

impl AnnotationSource for DirectoryStore {
    fn fetch_annotations<'a>(
        &'a self,
        identity: &'a str,
        revision: Option<&'a str>,
    ) -> PortFuture<'a, Annotations> {
        Box::pin(async move { self.read_annotations(identity, revision) })
    }
}

/// Flattens a JSON object into string annotations. Nulls, arrays and
/// nested objects are skipped.
pub(crate) fn parse_annotations(content: &str) -> Result<Annotations, serde_json::Error> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;
    Ok(object
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::String(s) => Some((key, s)),
            serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {
                Some((key, value.to_string()))
            }
            _ => None,
        })
        .collect())
}

fn is_dot_entry(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

fn is_sidecar(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n.to_string_lossy().ends_with(META_SUFFIX))
}

fn with_meta_suffix(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(META_SUFFIX);
    PathBuf::from(name)
}

fn relative_identity(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> =
        relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Maps a `/`-separated identity to a relative path, refusing anything
/// that could leave the root.
fn safe_relative(identity: &str) -> Option<PathBuf> {
    let path = PathBuf::from(identity);
    path.components().all(|c| matches!(c, Component::Normal(_))).then_some(path)
}

fn content_revision(path: &Path) -> Result<String, PortError> {
    let mut file = File::open(path).map_err(|e| PortError::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| PortError::io(path, e))?;
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(REVISION_HEX_LEN);
    Ok(digest)
}

fn modified_at(path: &Path) -> Result<DateTime<Utc>, PortError> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| PortError::io(path, e))?;
    Ok(DateTime::<Utc>::from(modified))
}

fn walk_error(root: &Path, err: walkdir::Error) -> PortError {
    let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
    PortError::io(path, io::Error::from(err))
}
