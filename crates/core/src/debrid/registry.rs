//! Provider name to client mapping.

use std::time::Duration;

use reqwest::Client;

use super::all_debrid::AllDebridClient;
use super::real_debrid::RealDebridClient;
use super::types::{DebridClient, DebridError};

/// Resolves a provider name plus API key to a concrete client.
///
/// Behind a trait so tests can substitute mock clients underneath the
/// gateway without touching real backends.
pub trait ClientRegistry: Send + Sync {
    fn create(&self, provider: &str, api_key: &str) -> Result<Box<dyn DebridClient>, DebridError>;
}

/// Registry backed by the real provider implementations.
///
/// The single point of extension for new backends. Pure mapping, no I/O;
/// it holds one shared HTTP client so per-request provider clients reuse
/// the same connection pool and timeout.
pub struct StandardRegistry {
    http: Client,
}

impl StandardRegistry {
    pub fn new(timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { http }
    }
}

impl Default for StandardRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ClientRegistry for StandardRegistry {
    fn create(&self, provider: &str, api_key: &str) -> Result<Box<dyn DebridClient>, DebridError> {
        match provider.to_ascii_lowercase().as_str() {
            "realdebrid" | "real-debrid" => Ok(Box::new(RealDebridClient::new(
                self.http.clone(),
                api_key.to_string(),
            ))),

            "alldebrid" | "all-debrid" => Ok(Box::new(AllDebridClient::new(
                self.http.clone(),
                api_key.to_string(),
            ))),

            // Recognized but not yet implemented
            "premiumize" | "torbox" | "debridlink" | "debrid-link" => {
                Err(DebridError::ComingSoon(provider.to_string()))
            }

            _ => Err(DebridError::UnsupportedProvider(provider.to_string())),
        }
    }
}
