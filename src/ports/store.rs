//! Build enumeration port.

use crate::build::Build;

use super::PortFuture;

/// Lists every build object in a storage location.
///
/// The result is unordered; callers sort it with
/// [`order_builds`](crate::build::order_builds). Paging through the
/// backing store, if any, is the adapter's concern.
pub trait BuildStore: Send + Sync {
    /// Enumerates all builds. An empty store yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage location cannot be read.
    fn list_builds(&self) -> PortFuture<'_, Vec<Build>>;
}
