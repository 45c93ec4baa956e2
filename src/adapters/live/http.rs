//! Build store backed by a JSON manifest served over HTTP.
//!
//! The manifest lists every stored object:
//!
//! ```json
//! { "builds": [
//!     { "key": "android/app.apk", "version_id": "3HL4kqtJ",
//!       "last_modified": "2024-05-01T09:00:00Z",
//!       "metadata": { "commit": "9f2c1ab", "sprint": "12" } }
//! ] }
//! ```
//!
//! Metadata arrives with the listing, so annotations are served from the
//! last manifest fetched.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::build::Build;
use crate::error::PortError;
use crate::ports::annotations::{AnnotationSource, Annotations};
use crate::ports::store::BuildStore;
use crate::ports::PortFuture;

/// Top-level manifest document.
#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    builds: Vec<ManifestEntry>,
}

/// One stored object in the manifest.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    key: String,
    #[serde(default)]
    version_id: Option<String>,
    last_modified: DateTime<Utc>,
    #[serde(default)]
    metadata: Annotations,
}

type AnnotationKey = (String, Option<String>);

/// Live store that fetches a manifest URL with `reqwest`.
pub struct HttpStore {
    client: Client,
    url: String,
    metadata: Mutex<HashMap<AnnotationKey, Annotations>>,
}

impl HttpStore {
    /// Creates a store reading the manifest at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: Client::new(), url: url.into(), metadata: Mutex::new(HashMap::new()) }
    }

    /// The manifest URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_manifest(&self) -> Result<Manifest, PortError> {
        let http_err = |message: String| PortError::Http { url: self.url.clone(), message };

        let response =
            self.client.get(&self.url).send().await.map_err(|e| http_err(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| http_err(e.to_string()))?;
        if !status.is_success() {
            return Err(http_err(format!("status {}", status.as_u16())));
        }
        parse_manifest(&body)
    }

    fn remember(&self, entries: &[ManifestEntry]) {
        let mut metadata = self.metadata.lock().unwrap_or_else(PoisonError::into_inner);
        metadata.clear();
        for entry in entries.iter().filter(|e| !e.metadata.is_empty()) {
            metadata.insert((entry.key.clone(), entry.version_id.clone()), entry.metadata.clone());
        }
    }
}

fn parse_manifest(body: &str) -> Result<Manifest, PortError> {
    serde_json::from_str(body).map_err(|e| PortError::parse("build manifest", e))
}

impl BuildStore for HttpStore {
    fn list_builds(&self) -> PortFuture<'_, Vec<Build>> {
        Box::pin(async move {
            let manifest = self.fetch_manifest().await?;
            self.remember(&manifest.builds);
            tracing::debug!(url = %self.url, count = manifest.builds.len(), "fetched build manifest");
            Ok(manifest
                .builds
                .into_iter()
                .map(|e| Build::new(e.key, e.version_id, e.last_modified))
                .collect())
        })
    }
}

impl AnnotationSource for HttpStore {
    fn fetch_annotations<'a>(
        &'a self,
        identity: &'a str,
        revision: Option<&'a str>,
    ) -> PortFuture<'a, Annotations> {
        Box::pin(async move {
            let metadata = self.metadata.lock().unwrap_or_else(PoisonError::into_inner);
            let key = (identity.to_string(), revision.map(str::to_string));
            Ok(metadata.get(&key).cloned().unwrap_or_default())
        })
    }
}
