use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub addon: AddonConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Gateway behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Public base URL override (e.g., "https://debridge.example.com").
    /// When unset, the base URL is derived from the request's Host header.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Timeout for debrid backend requests in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u32 {
    30
}

/// Per-client rate limiting for the resolve endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    /// Max resolve requests per minute per client address
    #[serde(default = "default_rpm")]
    pub requests_per_minute: u32,
    /// Upper bound on tracked client addresses; the limiter sweeps idle
    /// entries and admits unconditionally once saturated
    #[serde(default = "default_max_tracked")]
    pub max_tracked_clients: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            requests_per_minute: default_rpm(),
            max_tracked_clients: default_max_tracked(),
        }
    }
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_rpm() -> u32 {
    60
}

fn default_max_tracked() -> usize {
    4096
}

/// Addon identity advertised in the manifest
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddonConfig {
    #[serde(default = "default_addon_id")]
    pub id: String,
    #[serde(default = "default_addon_name")]
    pub name: String,
    #[serde(default = "default_addon_description")]
    pub description: String,
    #[serde(default = "default_addon_logo")]
    pub logo: String,
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            id: default_addon_id(),
            name: default_addon_name(),
            description: default_addon_description(),
            logo: default_addon_logo(),
        }
    }
}

fn default_addon_id() -> String {
    "community.debridge".to_string()
}

fn default_addon_name() -> String {
    "Debridge".to_string()
}

fn default_addon_description() -> String {
    "Search downloads and torrents in your Debrid cloud".to_string()
}

fn default_addon_logo() -> String {
    "https://i.imgur.com/jIqpCp5.png".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.gateway.request_timeout_secs, 30);
        assert!(config.gateway.base_url.is_none());
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.requests_per_minute, 60);
        assert_eq!(config.addon.id, "community.debridge");
    }

    #[test]
    fn test_deserialize_server_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_gateway_section() {
        let toml = r#"
[gateway]
base_url = "https://debridge.example.com"
request_timeout_secs = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.gateway.base_url.as_deref(),
            Some("https://debridge.example.com")
        );
        assert_eq!(config.gateway.request_timeout_secs, 10);
    }

    #[test]
    fn test_deserialize_rate_limit_section() {
        let toml = r#"
[rate_limit]
enabled = false
requests_per_minute = 5
max_tracked_clients = 100
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.rate_limit.requests_per_minute, 5);
        assert_eq!(config.rate_limit.max_tracked_clients, 100);
    }

    #[test]
    fn test_deserialize_addon_section_partial() {
        let toml = r#"
[addon]
name = "My Gateway"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.addon.name, "My Gateway");
        // Untouched fields keep their defaults
        assert_eq!(config.addon.id, "community.debridge");
    }
}
