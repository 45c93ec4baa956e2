//! Link signing port for time-limited download URLs.

use std::time::Duration;

use crate::error::PortError;

/// Produces download links that stop working after a lifetime.
pub trait LinkSigner: Send + Sync {
    /// Returns a URL for `identity` at `revision`, valid for `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity cannot be expressed as a URL.
    fn sign(&self, identity: &str, revision: Option<&str>, ttl: Duration)
        -> Result<String, PortError>;
}
