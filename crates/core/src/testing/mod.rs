//! Testing utilities and mock implementations.
//!
//! Provides a controllable `DebridClient` and `ClientRegistry` so gateway
//! and server tests run without touching real debrid backends.

mod mock_client;

pub use mock_client::{MockDebridClient, MockRegistry};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::debrid::{ItemFile, ItemKind, ItemPayload, OwnedItem};

    /// Create a cached torrent item with a single contained file.
    pub fn cached_torrent(name: &str, id: &str, size_bytes: u64) -> OwnedItem {
        OwnedItem {
            kind: ItemKind::CachedTorrent,
            name: name.to_string(),
            id: id.to_string(),
            size_bytes: Some(size_bytes),
            payload: ItemPayload::Files(vec![ItemFile {
                id: 1,
                path: name.to_string(),
                size_bytes,
            }]),
        }
    }

    /// Create a completed download item carrying a ready direct link.
    pub fn direct_download(name: &str, id: &str, link: &str) -> OwnedItem {
        OwnedItem {
            kind: ItemKind::DirectDownload,
            name: name.to_string(),
            id: id.to_string(),
            size_bytes: Some(1024 * 1024 * 700),
            payload: ItemPayload::DirectLink(link.to_string()),
        }
    }
}
