//! The two public gateway operations sitting above the provider registry.
//!
//! Stream listing is the cheap phase: list the account, match filenames,
//! format entries. Resolution is the deferred expensive phase: mint a
//! direct link for the one entry the user actually clicked.

use std::collections::HashMap;
use std::net::IpAddr;

use tracing::{debug, warn};

use crate::addon::{BehaviorHints, StreamEntry};
use crate::config::UserConfig;
use crate::debrid::{ClientRegistry, DebridError};

/// List protocol stream entries for a title.
///
/// Never fails: a missing API key, an empty account and a backend error
/// all degrade into a single renderable informational entry, so the
/// calling client always has something to show. The returned vec is never
/// empty.
pub async fn list_streams(
    registry: &dyn ClientRegistry,
    config: &UserConfig,
    title_type: &str,
    external_id: &str,
    extra: &HashMap<String, String>,
    base_url: &str,
) -> Vec<StreamEntry> {
    if config.api_key.is_empty() {
        return vec![configure_hint(base_url)];
    }

    debug!(
        provider = %config.debrid_provider,
        title_type,
        external_id,
        extra = ?extra,
        "Listing streams"
    );

    match fetch_streams(registry, config, external_id, base_url).await {
        Ok(streams) if streams.is_empty() => {
            vec![no_content(&config.debrid_provider, base_url)]
        }
        Ok(streams) => streams,
        Err(e) => {
            warn!(provider = %config.debrid_provider, error = %e, "Stream listing failed");
            vec![listing_error(&config.debrid_provider, &e, base_url)]
        }
    }
}

async fn fetch_streams(
    registry: &dyn ClientRegistry,
    config: &UserConfig,
    external_id: &str,
    base_url: &str,
) -> Result<Vec<StreamEntry>, DebridError> {
    let client = registry.create(&config.debrid_provider, &config.api_key)?;
    let items = client.search_by_external_id(external_id).await?;

    Ok(items
        .iter()
        .take(config.max_results)
        .map(|item| client.format_stream(item, base_url))
        .collect())
}

/// Resolve a stored reference to a direct download URL.
///
/// Unlike `list_streams` this propagates failures: a resolve without a
/// redirect target has no graceful substitute, so the HTTP boundary turns
/// the error into a status code.
pub async fn resolve_direct_url(
    registry: &dyn ClientRegistry,
    provider: &str,
    api_key: &str,
    item_id: &str,
    stored_ref: &str,
    client_ip: Option<IpAddr>,
) -> Result<String, DebridError> {
    debug!(provider, item_id, ?client_ip, "Resolving direct URL");

    // Ready direct links skip the backend entirely.
    if stored_ref != "#" && stored_ref.starts_with("http") {
        return Ok(stored_ref.to_string());
    }

    let client = registry.create(provider, api_key)?;
    for strategy in client.strategies() {
        match client.resolve_file(*strategy, item_id, 0).await? {
            Some(url) => return Ok(url),
            None => debug!(provider, item_id, ?strategy, "Strategy yielded no link"),
        }
    }

    Err(DebridError::ResolutionFailed(item_id.to_string()))
}

fn configure_hint(base_url: &str) -> StreamEntry {
    StreamEntry {
        name: "🔧 Configuration Required".to_string(),
        description: "Click to configure your Debrid API key".to_string(),
        url: None,
        external_url: Some(format!("{base_url}/configure")),
        behavior_hints: BehaviorHints { not_web_ready: true },
    }
}

fn no_content(provider: &str, base_url: &str) -> StreamEntry {
    StreamEntry {
        name: format!("📁 No content found in {provider}"),
        description: format!(
            "No files found for this title in your {provider} account. \
             Add content to your debrid account first."
        ),
        url: None,
        external_url: Some(format!("{base_url}/configure")),
        behavior_hints: BehaviorHints { not_web_ready: true },
    }
}

fn listing_error(provider: &str, error: &DebridError, base_url: &str) -> StreamEntry {
    StreamEntry {
        name: format!("❌ API Error: {error}"),
        description: format!("Failed to connect to {provider}. Check your API key."),
        url: None,
        external_url: Some(format!("{base_url}/configure")),
        behavior_hints: BehaviorHints { not_web_ready: true },
    }
}
