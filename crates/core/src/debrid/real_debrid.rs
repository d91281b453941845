//! Real-Debrid API client.

use async_trait::async_trait;
use futures::future;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::addon::StreamEntry;

use super::stream::format_stream_entry;
use super::types::{
    merge_listings, DebridClient, DebridError, ItemFile, ItemKind, ItemPayload, OwnedItem,
    ResolutionStrategy,
};

const API_BASE: &str = "https://api.real-debrid.com/rest/1.0";

const PROVIDER: &str = "Real-Debrid";

/// Real-Debrid client.
///
/// Owned content lives in two backend collections: cached torrents and
/// completed downloads. Both are listed and normalized into `OwnedItem`.
pub struct RealDebridClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl RealDebridClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: API_BASE.to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, DebridError> {
        match self.get_json_optional(endpoint).await? {
            Some(value) => Ok(value),
            None => Err(api_error(format!("HTTP 404 on {endpoint}"))),
        }
    }

    /// Like `get_json` but maps a 404 to `Ok(None)` for lookups of items
    /// that may have been deleted from the account.
    async fn get_json_optional<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Option<T>, DebridError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DebridError::Timeout
                } else if e.is_connect() {
                    DebridError::ConnectionFailed(e.to_string())
                } else {
                    api_error(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| api_error(format!("Failed to parse response: {e}")))
    }

    async fn list_torrents(&self) -> Result<Vec<OwnedItem>, DebridError> {
        let torrents: Vec<RdTorrent> = self.get_json("/torrents").await?;
        debug!(count = torrents.len(), "Fetched Real-Debrid torrents");
        Ok(torrents
            .into_iter()
            .filter_map(RdTorrent::into_owned_item)
            .collect())
    }

    async fn list_downloads(&self) -> Result<Vec<OwnedItem>, DebridError> {
        let downloads: Vec<RdDownload> = self.get_json("/downloads").await?;
        debug!(count = downloads.len(), "Fetched Real-Debrid downloads");
        Ok(downloads
            .into_iter()
            .filter_map(RdDownload::into_owned_item)
            .collect())
    }
}

fn api_error(message: String) -> DebridError {
    DebridError::Api {
        provider: PROVIDER,
        message,
    }
}

#[async_trait]
impl DebridClient for RealDebridClient {
    fn provider_name(&self) -> &'static str {
        "realdebrid"
    }

    fn short_tag(&self) -> &'static str {
        "RD"
    }

    fn strategies(&self) -> &'static [ResolutionStrategy] {
        &[ResolutionStrategy::Torrent]
    }

    async fn list_owned_items(&self) -> Result<Vec<OwnedItem>, DebridError> {
        // Independent collections; fan out and join.
        let (torrents, downloads) =
            future::join(self.list_torrents(), self.list_downloads()).await;
        merge_listings(torrents, downloads, PROVIDER)
    }

    async fn resolve_file(
        &self,
        strategy: ResolutionStrategy,
        item_id: &str,
        file_index: usize,
    ) -> Result<Option<String>, DebridError> {
        if strategy != ResolutionStrategy::Torrent {
            return Ok(None);
        }

        let info: Option<RdTorrentInfo> = self
            .get_json_optional(&format!("/torrents/info/{item_id}"))
            .await?;
        let Some(info) = info else {
            debug!(item_id, "Torrent no longer exists");
            return Ok(None);
        };

        Ok(info
            .links
            .into_iter()
            .nth(file_index)
            .filter(|link| !link.is_empty()))
    }

    fn format_stream(&self, item: &OwnedItem, base_url: &str) -> StreamEntry {
        format_stream_entry(
            self.short_tag(),
            self.provider_name(),
            &self.api_key,
            item,
            base_url,
        )
    }
}

// Real-Debrid API response types

#[derive(Debug, Deserialize)]
struct RdTorrent {
    id: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    bytes: Option<u64>,
    #[serde(default)]
    files: Option<Vec<RdTorrentFile>>,
}

#[derive(Debug, Deserialize)]
struct RdTorrentFile {
    id: i64,
    path: String,
    #[serde(default)]
    bytes: u64,
}

impl RdTorrent {
    fn into_owned_item(self) -> Option<OwnedItem> {
        let name = self.filename.filter(|n| !n.is_empty())?;
        let files = self
            .files
            .unwrap_or_default()
            .into_iter()
            .map(|f| ItemFile {
                id: f.id,
                path: f.path,
                size_bytes: f.bytes,
            })
            .collect();

        Some(OwnedItem {
            kind: ItemKind::CachedTorrent,
            name,
            id: self.id,
            size_bytes: self.bytes,
            payload: ItemPayload::Files(files),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RdDownload {
    id: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    filesize: Option<u64>,
    #[serde(default)]
    download: Option<String>,
}

impl RdDownload {
    fn into_owned_item(self) -> Option<OwnedItem> {
        let name = self.filename.filter(|n| !n.is_empty())?;
        let link = self.download.filter(|l| !l.is_empty())?;

        Some(OwnedItem {
            kind: ItemKind::DirectDownload,
            name,
            id: self.id,
            size_bytes: self.filesize,
            payload: ItemPayload::DirectLink(link),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RdTorrentInfo {
    #[serde(default)]
    links: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torrent_normalization() {
        let json = r#"[
            {
                "id": "ABCDEF",
                "filename": "The.Matrix.1999.tt0133093.1080p.mkv",
                "hash": "deadbeef",
                "bytes": 2254857830,
                "progress": 100,
                "files": [
                    {"id": 1, "path": "/The.Matrix.1999.tt0133093.1080p.mkv", "bytes": 2254857830, "selected": 1}
                ]
            },
            {
                "id": "NONAME",
                "filename": "",
                "bytes": 100
            }
        ]"#;

        let torrents: Vec<RdTorrent> = serde_json::from_str(json).unwrap();
        let items: Vec<OwnedItem> = torrents
            .into_iter()
            .filter_map(RdTorrent::into_owned_item)
            .collect();

        // Name-less entries are unmatchable and dropped
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.kind, ItemKind::CachedTorrent);
        assert_eq!(item.id, "ABCDEF");
        assert_eq!(item.size_bytes, Some(2_254_857_830));
        assert_eq!(item.stored_ref(), "#");
        match &item.payload {
            ItemPayload::Files(files) => {
                assert_eq!(files.len(), 1);
                assert_eq!(files[0].id, 1);
            }
            other => panic!("Expected Files payload, got {other:?}"),
        }
    }

    #[test]
    fn test_download_normalization() {
        let json = r#"[
            {
                "id": "DL1",
                "filename": "Show.S01E01.720p.mkv",
                "filesize": 734003200,
                "download": "https://cdn.real-debrid.com/dl/Show.S01E01.720p.mkv"
            },
            {
                "id": "DL2",
                "filename": "broken-entry.mkv"
            }
        ]"#;

        let downloads: Vec<RdDownload> = serde_json::from_str(json).unwrap();
        let items: Vec<OwnedItem> = downloads
            .into_iter()
            .filter_map(RdDownload::into_owned_item)
            .collect();

        // Entries without a download link cannot be played and are dropped
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, ItemKind::DirectDownload);
        assert_eq!(
            items[0].stored_ref(),
            "https://cdn.real-debrid.com/dl/Show.S01E01.720p.mkv"
        );
    }

    #[test]
    fn test_torrent_info_defaults_to_empty_links() {
        let info: RdTorrentInfo = serde_json::from_str("{}").unwrap();
        assert!(info.links.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_ignores_undeclared_strategy() {
        let client = RealDebridClient::new(Client::new(), "key".to_string());
        let resolved = client
            .resolve_file(ResolutionStrategy::Magnet, "ABCDEF", 0)
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_format_stream_routes_through_gateway() {
        let client = RealDebridClient::new(Client::new(), "key".to_string());
        let item = OwnedItem {
            kind: ItemKind::CachedTorrent,
            name: "The.Matrix.1999.tt0133093.1080p.mkv".to_string(),
            id: "ABCDEF".to_string(),
            size_bytes: Some(2_254_857_830),
            payload: ItemPayload::Files(vec![]),
        };

        let entry = client.format_stream(&item, "http://localhost:8080");
        assert!(entry.name.contains("RD"));
        assert!(entry.name.contains("1080p"));
        assert_eq!(
            entry.url.as_deref(),
            Some("http://localhost:8080/resolve/realdebrid/key/ABCDEF/%23")
        );
    }
}
