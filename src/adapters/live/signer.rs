//! Link signer producing expiring, digest-authenticated URLs.
//!
//! A link looks like
//! `<base>/<identity>?versionId=<rev>&expires=<unix>&signature=<hex>`,
//! where the signature is an HMAC-SHA256, keyed by the shared secret, over
//! the identity, revision and expiry joined by newlines. Whatever serves the
//! files recomputes it to decide whether to honour the request.

use std::sync::Arc;
use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::Sha256;

use crate::error::{ConfigError, PortError};
use crate::ports::clock::Clock;
use crate::ports::signer::LinkSigner;

type HmacSha256 = Hmac<Sha256>;

/// Signs links against a base URL with a shared secret.
pub struct DigestLinkSigner {
    base: Url,
    secret: String,
    clock: Arc<dyn Clock>,
}

impl DigestLinkSigner {
    /// Creates a signer for links under `base`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `base` is not an absolute URL
    /// that can carry a path.
    pub fn new(base: &str, secret: impl Into<String>, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            key: "LINK_BASE_URL",
            value: base.to_string(),
            reason,
        };
        let base = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".into()));
        }
        Ok(Self::from_url(base, secret, clock))
    }

    /// Creates a signer from an already-parsed base URL.
    pub fn from_url(base: Url, secret: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self { base, secret: secret.into(), clock }
    }

    /// The base every link is built on.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Signature for one link.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Signing`] if the secret cannot key the MAC.
    pub fn signature(
        &self,
        identity: &str,
        revision: Option<&str>,
        expires: i64,
    ) -> Result<String, PortError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).map_err(|e| {
            PortError::Signing { identity: identity.to_string(), message: e.to_string() }
        })?;
        mac.update(identity.as_bytes());
        mac.update(b"\n");
        mac.update(revision.unwrap_or_default().as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl LinkSigner for DigestLinkSigner {
    fn sign(
        &self,
        identity: &str,
        revision: Option<&str>,
        ttl: Duration,
    ) -> Result<String, PortError> {
        let signing_err =
            |message: &str| PortError::Signing { identity: identity.to_string(), message: message.into() };

        let ttl = i64::try_from(ttl.as_secs()).map_err(|_| signing_err("link lifetime too long"))?;
        let expires = self
            .clock
            .now()
            .timestamp()
            .checked_add(ttl)
            .ok_or_else(|| signing_err("link expiry overflows"))?;

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| signing_err("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(identity.split('/').filter(|s| !s.is_empty()));
        {
            let mut query = url.query_pairs_mut();
            if let Some(revision) = revision {
                query.append_pair("versionId", revision);
            }
            query.append_pair("expires", &expires.to_string());
            query.append_pair("signature", &self.signature(identity, revision, expires)?);
        }
        Ok(url.into())
    }
}
