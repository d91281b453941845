//! Opaque per-user configuration tokens.
//!
//! The media-center client carries all per-user settings as a base64-encoded
//! JSON blob embedded directly in URL paths, so the gateway itself never
//! stores anything about a user.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ConfigError;

/// Provider assumed when no valid token is supplied.
pub const DEFAULT_PROVIDER: &str = "realdebrid";

const MIN_RESULTS: usize = 1;
const MAX_RESULTS: usize = 50;

/// Per-user settings decoded from the opaque URL token.
///
/// The provider is kept as the raw string from the token: an unknown name
/// must surface as a typed registry error on use, not disappear into the
/// decode fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    pub debrid_provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    10
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            debrid_provider: DEFAULT_PROVIDER.to_string(),
            api_key: String::new(),
            max_results: default_max_results(),
        }
    }
}

impl UserConfig {
    /// Encode into the opaque token carried in URL paths.
    pub fn encode(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        BASE64.encode(json)
    }

    /// Decode an opaque token.
    ///
    /// Tolerates a leftover layer of percent-encoding (the install link is
    /// built in a browser); `max_results` is clamped into its valid range.
    pub fn decode(token: &str) -> Result<Self, ConfigError> {
        let raw = urlencoding::decode(token)
            .map_err(|e| ConfigError::TokenDecode(e.to_string()))?;
        let bytes = BASE64
            .decode(raw.as_bytes())
            .map_err(|e| ConfigError::TokenDecode(e.to_string()))?;
        let mut config: UserConfig = serde_json::from_slice(&bytes)
            .map_err(|e| ConfigError::TokenDecode(e.to_string()))?;
        config.max_results = config.max_results.clamp(MIN_RESULTS, MAX_RESULTS);
        Ok(config)
    }

    /// Decode a token, falling back to the default configuration when the
    /// token is absent or malformed. Never fails.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            None => Self::default(),
            Some(token) => Self::decode(token).unwrap_or_else(|e| {
                debug!(error = %e, "Malformed config token, using defaults");
                Self::default()
            }),
        }
    }
}
