//! All-Debrid API client.

use async_trait::async_trait;
use futures::future;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::addon::StreamEntry;

use super::stream::format_stream_entry;
use super::types::{
    merge_listings, DebridClient, DebridError, ItemFile, ItemKind, ItemPayload, OwnedItem,
    ResolutionStrategy,
};

const API_BASE: &str = "https://api.alldebrid.com/v4";

const PROVIDER: &str = "All-Debrid";

/// Agent name All-Debrid requires on every call.
const AGENT: &str = "debridge";

/// All-Debrid client.
///
/// Every response is wrapped in a `{status, data, error}` envelope; a
/// non-"success" status with a 200 is still a backend error.
pub struct AllDebridClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl AllDebridClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: API_BASE.to_string(),
        }
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, DebridError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .http
            .get(&url)
            .query(&[("agent", AGENT), ("apikey", self.api_key.as_str())])
            .query(params)
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
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let envelope: AdEnvelope<T> = response
            .json()
            .await
            .map_err(|e| api_error(format!("Failed to parse response: {e}")))?;
        envelope.into_data()
    }

    async fn list_magnets(&self) -> Result<Vec<OwnedItem>, DebridError> {
        let data: AdMagnets = self.get_data("/magnet/status", &[]).await?;
        debug!(count = data.magnets.len(), "Fetched All-Debrid magnets");
        Ok(data
            .magnets
            .into_iter()
            .filter_map(AdMagnet::into_owned_item)
            .collect())
    }

    async fn list_links(&self) -> Result<Vec<OwnedItem>, DebridError> {
        let data: AdLinks = self.get_data("/link/history", &[("limit", "100")]).await?;
        debug!(count = data.links.len(), "Fetched All-Debrid link history");
        Ok(data
            .links
            .into_iter()
            .filter_map(AdLink::into_owned_item)
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
impl DebridClient for AllDebridClient {
    fn provider_name(&self) -> &'static str {
        "alldebrid"
    }

    fn short_tag(&self) -> &'static str {
        "AD"
    }

    fn strategies(&self) -> &'static [ResolutionStrategy] {
        &[ResolutionStrategy::Magnet]
    }

    async fn list_owned_items(&self) -> Result<Vec<OwnedItem>, DebridError> {
        // Independent collections; fan out and join.
        let (magnets, links) = future::join(self.list_magnets(), self.list_links()).await;
        merge_listings(magnets, links, PROVIDER)
    }

    async fn resolve_file(
        &self,
        strategy: ResolutionStrategy,
        item_id: &str,
        file_index: usize,
    ) -> Result<Option<String>, DebridError> {
        if strategy != ResolutionStrategy::Magnet {
            return Ok(None);
        }

        // An explicit error envelope here means the magnet id is gone,
        // which is a not-found, not a failure.
        let data: AdMagnets = match self.get_data("/magnet/status", &[("id", item_id)]).await {
            Ok(data) => data,
            Err(DebridError::Api { message, .. }) => {
                debug!(item_id, error = %message, "Magnet no longer resolvable");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(magnet) = data.magnets.into_iter().next() else {
            return Ok(None);
        };

        Ok(magnet
            .links
            .into_iter()
            .nth(file_index)
            .map(|l| l.link)
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

// All-Debrid API response types

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct AdEnvelope<T> {
    status: String,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<AdError>,
}

#[derive(Debug, Deserialize)]
struct AdError {
    #[serde(default)]
    message: String,
}

impl<T> AdEnvelope<T> {
    fn into_data(self) -> Result<T, DebridError> {
        if self.status == "success" {
            self.data
                .ok_or_else(|| api_error("Missing data in response".to_string()))
        } else {
            let message = self
                .error
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Unknown error".to_string());
            Err(api_error(message))
        }
    }
}

#[derive(Debug, Deserialize)]
struct AdMagnets {
    #[serde(default)]
    magnets: Vec<AdMagnet>,
}

#[derive(Debug, Deserialize)]
struct AdMagnet {
    id: i64,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    links: Vec<AdMagnetLink>,
}

#[derive(Debug, Deserialize)]
struct AdMagnetLink {
    #[serde(default)]
    link: String,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    size: u64,
}

impl AdMagnet {
    fn into_owned_item(self) -> Option<OwnedItem> {
        let name = self.filename.filter(|n| !n.is_empty())?;
        let files = self
            .links
            .into_iter()
            .enumerate()
            .map(|(index, link)| ItemFile {
                id: index as i64,
                path: link.filename,
                size_bytes: link.size,
            })
            .collect();

        Some(OwnedItem {
            kind: ItemKind::CachedTorrent,
            name,
            id: self.id.to_string(),
            size_bytes: self.size,
            payload: ItemPayload::Files(files),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AdLinks {
    #[serde(default)]
    links: Vec<AdLink>,
}

#[derive(Debug, Deserialize)]
struct AdLink {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    link: Option<String>,
}

impl AdLink {
    fn into_owned_item(self) -> Option<OwnedItem> {
        let name = self.filename.filter(|n| !n.is_empty())?;
        let link = self.link.filter(|l| !l.is_empty())?;
        let id = self.id.unwrap_or_else(|| link.clone());

        Some(OwnedItem {
            kind: ItemKind::DirectDownload,
            name,
            id,
            size_bytes: self.size,
            payload: ItemPayload::DirectLink(link),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success() {
        let json = r#"{"status": "success", "data": {"magnets": []}}"#;
        let envelope: AdEnvelope<AdMagnets> = serde_json::from_str(json).unwrap();
        assert!(envelope.into_data().unwrap().magnets.is_empty());
    }

    #[test]
    fn test_envelope_error() {
        let json = r#"{"status": "error", "error": {"code": "AUTH_BAD_APIKEY", "message": "Invalid token"}}"#;
        let envelope: AdEnvelope<AdMagnets> = serde_json::from_str(json).unwrap();
        let err = envelope.into_data().unwrap_err();
        match err {
            DebridError::Api { provider, message } => {
                assert_eq!(provider, "All-Debrid");
                assert_eq!(message, "Invalid token");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_magnet_normalization() {
        let json = r#"{
            "magnets": [
                {
                    "id": 123456,
                    "filename": "The.Matrix.1999.tt0133093.2160p.mkv",
                    "size": 15032385536,
                    "statusCode": 4,
                    "links": [
                        {"link": "https://alldebrid.com/f/abc", "filename": "The.Matrix.1999.tt0133093.2160p.mkv", "size": 15032385536}
                    ]
                },
                {"id": 999}
            ]
        }"#;

        let data: AdMagnets = serde_json::from_str(json).unwrap();
        let items: Vec<OwnedItem> = data
            .magnets
            .into_iter()
            .filter_map(AdMagnet::into_owned_item)
            .collect();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "123456");
        assert_eq!(items[0].kind, ItemKind::CachedTorrent);
        match &items[0].payload {
            ItemPayload::Files(files) => {
                assert_eq!(files.len(), 1);
                assert_eq!(files[0].id, 0);
                assert_eq!(files[0].size_bytes, 15_032_385_536);
            }
            other => panic!("Expected Files payload, got {other:?}"),
        }
    }

    #[test]
    fn test_link_history_normalization() {
        let json = r#"{
            "links": [
                {"id": "L1", "filename": "Show.S01E01.720p.mkv", "size": 734003200, "link": "https://alldebrid.com/f/xyz"},
                {"filename": "no-link.mkv"}
            ]
        }"#;

        let data: AdLinks = serde_json::from_str(json).unwrap();
        let items: Vec<OwnedItem> = data
            .links
            .into_iter()
            .filter_map(AdLink::into_owned_item)
            .collect();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "L1");
        assert_eq!(items[0].stored_ref(), "https://alldebrid.com/f/xyz");
    }

    #[tokio::test]
    async fn test_resolve_ignores_undeclared_strategy() {
        let client = AllDebridClient::new(Client::new(), "key".to_string());
        let resolved = client
            .resolve_file(ResolutionStrategy::Torrent, "123456", 0)
            .await
            .unwrap();
        assert!(resolved.is_none());
    }
}
