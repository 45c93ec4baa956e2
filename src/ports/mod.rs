//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the listing core and an
//! external system (time, build storage, annotations, link signing).
//! Implementations live in `src/adapters/`.

pub mod annotations;
pub mod clock;
pub mod signer;
pub mod store;

use std::future::Future;
use std::pin::Pin;

use crate::error::PortError;

pub use annotations::{AnnotationSource, Annotations};
pub use clock::Clock;
pub use signer::LinkSigner;
pub use store::BuildStore;

/// Boxed future returned by async ports, keeping the traits dyn-compatible.
pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PortError>> + Send + 'a>>;
