//! Stremio addon protocol surface.
//!
//! Only the two resources this gateway serves: the manifest and stream
//! responses. Catalogs are deliberately empty.

mod manifest;
mod types;

pub use manifest::{Manifest, ManifestBehaviorHints};
pub use types::{BehaviorHints, StreamEntry, StreamsResponse};
