//! Live adapters for real external interactions.

pub mod clock;
pub mod directory;
pub mod http;
pub mod signer;

pub use clock::{FixedClock, SystemClock};
pub use directory::DirectoryStore;
pub use http::HttpStore;
pub use signer::DigestLinkSigner;
