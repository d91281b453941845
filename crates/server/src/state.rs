use std::net::IpAddr;
use std::sync::Arc;

use debridge_core::{ClientRegistry, Config, Manifest};

use crate::ratelimit::ClientRateLimiter;

/// Shared application state
pub struct AppState {
    config: Config,
    registry: Arc<dyn ClientRegistry>,
    rate_limiter: ClientRateLimiter,
}

impl AppState {
    pub fn new(config: Config, registry: Arc<dyn ClientRegistry>) -> Self {
        let rate_limiter = ClientRateLimiter::new(&config.rate_limit);
        Self {
            config,
            registry,
            rate_limiter,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &dyn ClientRegistry {
        self.registry.as_ref()
    }

    /// Admission decision for the resolve endpoint. Advisory only.
    pub async fn admit(&self, client: IpAddr) -> bool {
        self.rate_limiter.check(client).await
    }

    pub fn manifest(&self) -> Manifest {
        Manifest::new(&self.config.addon)
    }

    /// Public base URL used when building resolve and configure links:
    /// the configured override, else derived from the request's Host header.
    pub fn base_url(&self, host: Option<&str>) -> String {
        if let Some(base) = &self.config.gateway.base_url {
            return base.clone();
        }
        match host {
            Some(host) => format!("http://{host}"),
            None => format!(
                "http://{}:{}",
                self.config.server.host, self.config.server.port
            ),
        }
    }
}
