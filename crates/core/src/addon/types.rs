use serde::{Deserialize, Serialize};

/// A single playable (or informational) entry in a stream response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEntry {
    /// Short label shown in the stream list, e.g. "RD 🔗 1080p (2.1 GB)".
    pub name: String,
    /// Longer text, usually the filename.
    pub description: String,
    /// Playback URL. Always points back into this gateway's resolve
    /// endpoint, never directly at a provider CDN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Opened in a browser instead of the player; used by informational
    /// entries that link to the configure page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    pub behavior_hints: BehaviorHints,
}

/// Hints telling the client how to treat a stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    #[serde(default)]
    pub not_web_ready: bool,
}

/// Body of a stream lookup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamsResponse {
    pub streams: Vec<StreamEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_entry_serializes_camel_case() {
        let entry = StreamEntry {
            name: "RD 🔗 1080p".to_string(),
            description: "Movie.2024.1080p.mkv".to_string(),
            url: Some("http://localhost/resolve/realdebrid/key/id/%23".to_string()),
            external_url: None,
            behavior_hints: BehaviorHints { not_web_ready: true },
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["behaviorHints"]["notWebReady"], true);
        assert!(json.get("externalUrl").is_none());
        assert!(json["url"].as_str().unwrap().contains("/resolve/"));
    }

    #[test]
    fn test_streams_response_shape() {
        let response = StreamsResponse { streams: vec![] };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"streams":[]}"#);
    }
}
