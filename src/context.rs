//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::Arc;

use reqwest::Url;

use crate::adapters::live::{DigestLinkSigner, DirectoryStore, FixedClock, HttpStore, SystemClock};
use crate::adapters::snapshot::SnapshotStore;
use crate::config::{Config, StorageLocation};
use crate::error::{BuildListError, ConfigError};
use crate::ports::annotations::AnnotationSource;
use crate::ports::clock::Clock;
use crate::ports::signer::LinkSigner;
use crate::ports::store::BuildStore;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. The store and the
/// annotation source are usually the same adapter seen through two traits.
pub struct ServiceContext {
    /// Clock for link expiry and page timestamps.
    pub clock: Arc<dyn Clock>,
    /// Build enumeration.
    pub store: Arc<dyn BuildStore>,
    /// Per-build metadata.
    pub annotations: Arc<dyn AnnotationSource>,
    /// Download link signing.
    pub signer: Box<dyn LinkSigner>,
}

impl ServiceContext {
    /// Assembles a context from explicit adapters.
    pub fn new(
        clock: Arc<dyn Clock>,
        store: Arc<dyn BuildStore>,
        annotations: Arc<dyn AnnotationSource>,
        signer: Box<dyn LinkSigner>,
    ) -> Self {
        Self { clock, store, annotations, signer }
    }

    /// Wires live adapters for the configured storage location.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot cannot be loaded or no usable link
    /// base URL can be determined.
    pub fn from_config(config: &Config) -> Result<Self, BuildListError> {
        let clock: Arc<dyn Clock> = match config.now {
            Some(now) => Arc::new(FixedClock(now)),
            None => Arc::new(SystemClock),
        };

        let (store, annotations, derived_base) = match &config.storage {
            StorageLocation::Directory(root) => {
                let (store, annotations) = shared(DirectoryStore::new(root));
                (store, annotations, directory_base(root))
            }
            StorageLocation::Http(url) => {
                let (store, annotations) = shared(HttpStore::new(url.clone()));
                (store, annotations, http_base(url))
            }
            StorageLocation::Snapshot(path) => {
                let replay = SnapshotStore::open(path)?;
                let base = snapshot_base(&replay.snapshot().source);
                let (store, annotations) = shared(replay);
                (store, annotations, base)
            }
        };

        let signer = match &config.link_base_url {
            Some(base) => DigestLinkSigner::new(base, config.signing_secret.clone(), clock.clone())?,
            None => {
                let base = derived_base.ok_or(ConfigError::Missing("LINK_BASE_URL"))?;
                DigestLinkSigner::from_url(base, config.signing_secret.clone(), clock.clone())
            }
        };
        tracing::debug!(base = %signer.base(), "link signer ready");

        Ok(Self::new(clock, store, annotations, Box::new(signer)))
    }
}

/// One adapter serving both the store and the annotation port.
fn shared<T>(adapter: T) -> (Arc<dyn BuildStore>, Arc<dyn AnnotationSource>)
where
    T: BuildStore + AnnotationSource + 'static,
{
    let adapter = Arc::new(adapter);
    (adapter.clone(), adapter)
}

fn directory_base(root: &Path) -> Option<Url> {
    let absolute = std::path::absolute(root).ok()?;
    Url::from_directory_path(absolute).ok()
}

fn http_base(manifest: &str) -> Option<Url> {
    Url::parse(manifest).ok()?.join("./").ok()
}

/// Link base for a replayed snapshot, derived from where it was captured.
fn snapshot_base(source: &str) -> Option<Url> {
    match source.parse::<StorageLocation>().ok()? {
        StorageLocation::Directory(root) => directory_base(&root),
        StorageLocation::Http(url) => http_base(&url),
        StorageLocation::Snapshot(_) => None,
    }
}
