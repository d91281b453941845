//! Types for the debrid provider abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::addon::StreamEntry;

use super::matching::matches_external_id;

/// Errors that can occur during debrid provider operations.
#[derive(Debug, Error)]
pub enum DebridError {
    #[error("Unsupported debrid provider: {0}")]
    UnsupportedProvider(String),

    #[error("{0} support coming soon")]
    ComingSoon(String),

    #[error("API key is required")]
    MissingApiKey,

    #[error("{provider} API error: {message}")]
    Api {
        provider: &'static str,
        message: String,
    },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("No direct link available for item {0}")]
    ResolutionFailed(String),
}

/// How an item is stored on the provider side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A torrent or magnet cached by the provider; its files need a
    /// resolve step before they can be played.
    CachedTorrent,
    /// A completed download that already carries a direct link.
    DirectDownload,
}

/// A file inside a multi-file torrent or magnet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFile {
    /// Provider-scoped file identifier (or index where the backend has none).
    pub id: i64,
    /// Path within the torrent.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Kind-specific data needed to resolve an item later.
#[derive(Debug, Clone)]
pub enum ItemPayload {
    /// Contained files of a cached torrent/magnet.
    Files(Vec<ItemFile>),
    /// An existing direct link, playable without another backend call.
    DirectLink(String),
}

/// Provider-agnostic shape of a file the user already owns.
#[derive(Debug, Clone)]
pub struct OwnedItem {
    pub kind: ItemKind,
    /// Filename as known to the provider; the matching key. Never empty:
    /// name-less items are dropped during normalization.
    pub name: String,
    /// Provider-scoped stable identifier.
    pub id: String,
    /// Size in bytes, when the backend reports one.
    pub size_bytes: Option<u64>,
    pub payload: ItemPayload,
}

impl OwnedItem {
    /// The stored reference embedded in stream URLs: the ready direct link
    /// when there is one, otherwise a `#` placeholder meaning "resolve on
    /// click".
    pub fn stored_ref(&self) -> &str {
        match &self.payload {
            ItemPayload::DirectLink(link) => link,
            ItemPayload::Files(_) => "#",
        }
    }
}

/// A resolution strategy a provider declares support for.
///
/// Declared statically per client and enumerated in order by the gateway,
/// rather than probing clients for optional capabilities at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStrategy {
    /// Re-fetch torrent details and pick the requested file's link.
    Torrent,
    /// Re-fetch magnet status and pick the requested file's link.
    Magnet,
}

/// Trait implemented by every debrid backend.
#[async_trait]
pub trait DebridClient: Send + Sync + std::fmt::Debug {
    /// Canonical provider name used in resolve URLs, e.g. "realdebrid".
    fn provider_name(&self) -> &'static str;

    /// Short tag prefixed to stream names, e.g. "RD".
    fn short_tag(&self) -> &'static str;

    /// Resolution strategies this backend supports, in priority order.
    fn strategies(&self) -> &'static [ResolutionStrategy];

    /// List everything the account currently holds, normalized to
    /// `OwnedItem`.
    ///
    /// Empty-but-valid backend responses yield an empty vec; only network,
    /// auth and HTTP-status failures are errors.
    async fn list_owned_items(&self) -> Result<Vec<OwnedItem>, DebridError>;

    /// List owned items whose filename matches the external identifier.
    async fn search_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Vec<OwnedItem>, DebridError> {
        let items = self.list_owned_items().await?;
        Ok(items
            .into_iter()
            .filter(|item| matches_external_id(&item.name, external_id))
            .collect())
    }

    /// Turn a stored item reference into a direct download URL.
    ///
    /// This is the expensive, possibly rate-limited call, deferred until the
    /// user actually picks a stream. Returns `Ok(None)` when the item or
    /// file index no longer exists; the caller decides how to present that.
    async fn resolve_file(
        &self,
        strategy: ResolutionStrategy,
        item_id: &str,
        file_index: usize,
    ) -> Result<Option<String>, DebridError>;

    /// Format an owned item as a protocol stream entry. Pure, no I/O.
    fn format_stream(&self, item: &OwnedItem, base_url: &str) -> StreamEntry;
}

/// Merge the two concurrently fetched listing halves.
///
/// One failed half degrades to the other's results with a warning; both
/// failing propagates the first error.
pub(crate) fn merge_listings(
    first: Result<Vec<OwnedItem>, DebridError>,
    second: Result<Vec<OwnedItem>, DebridError>,
    provider: &'static str,
) -> Result<Vec<OwnedItem>, DebridError> {
    match (first, second) {
        (Ok(mut items), Ok(mut more)) => {
            items.append(&mut more);
            Ok(items)
        }
        (Ok(items), Err(e)) | (Err(e), Ok(items)) => {
            warn!(provider, error = %e, "One listing failed, keeping partial results");
            Ok(items)
        }
        (Err(e), Err(_)) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torrent_item(name: &str) -> OwnedItem {
        OwnedItem {
            kind: ItemKind::CachedTorrent,
            name: name.to_string(),
            id: "id".to_string(),
            size_bytes: None,
            payload: ItemPayload::Files(vec![]),
        }
    }

    #[test]
    fn test_stored_ref_for_torrent_is_placeholder() {
        assert_eq!(torrent_item("file.mkv").stored_ref(), "#");
    }

    #[test]
    fn test_stored_ref_for_direct_download_is_link() {
        let item = OwnedItem {
            kind: ItemKind::DirectDownload,
            name: "file.mkv".to_string(),
            id: "id".to_string(),
            size_bytes: Some(1024),
            payload: ItemPayload::DirectLink("https://cdn.example/file.mkv".to_string()),
        };
        assert_eq!(item.stored_ref(), "https://cdn.example/file.mkv");
    }

    #[test]
    fn test_merge_listings_concatenates() {
        let merged = merge_listings(
            Ok(vec![torrent_item("a"), torrent_item("b")]),
            Ok(vec![torrent_item("c")]),
            "Test",
        )
        .unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[2].name, "c");
    }

    #[test]
    fn test_merge_listings_tolerates_one_failure() {
        let merged = merge_listings(
            Err(DebridError::Timeout),
            Ok(vec![torrent_item("a")]),
            "Test",
        )
        .unwrap();
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_merge_listings_propagates_double_failure() {
        let result = merge_listings(
            Err(DebridError::Timeout),
            Err(DebridError::ConnectionFailed("down".to_string())),
            "Test",
        );
        assert!(matches!(result, Err(DebridError::Timeout)));
    }
}
