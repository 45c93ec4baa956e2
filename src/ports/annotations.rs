//! Annotation port for per-build metadata.

use std::collections::BTreeMap;

use super::PortFuture;

/// Free-form key/value metadata attached to a build (commit, branch, sprint).
pub type Annotations = BTreeMap<String, String>;

/// Fetches annotations for a single build.
pub trait AnnotationSource: Send + Sync {
    /// Returns the annotations of `identity` at `revision`. A build without
    /// metadata yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata exists but cannot be read. Callers
    /// treat such failures as "no annotations".
    fn fetch_annotations<'a>(
        &'a self,
        identity: &'a str,
        revision: Option<&'a str>,
    ) -> PortFuture<'a, Annotations>;
}

/// Looks up `key` ignoring ASCII case.
#[must_use]
pub fn get_ignore_case<'a>(annotations: &'a Annotations, key: &str) -> Option<&'a str> {
    annotations.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v.as_str())
}
