//! Addon manifest served to the media-center client.

use serde::{Deserialize, Serialize};

use crate::config::AddonConfig;

/// Protocol manifest describing what this addon provides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub logo: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub id_prefixes: Vec<String>,
    pub catalogs: Vec<serde_json::Value>,
    pub behavior_hints: ManifestBehaviorHints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestBehaviorHints {
    pub configurable: bool,
    pub configuration_required: bool,
}

impl Manifest {
    /// Build the manifest from the configured addon identity.
    ///
    /// Resources and types are fixed: this gateway answers stream lookups
    /// for movies and series addressed by `tt` identifiers, nothing else.
    pub fn new(addon: &AddonConfig) -> Self {
        Self {
            id: addon.id.clone(),
            name: addon.name.clone(),
            description: addon.description.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            logo: addon.logo.clone(),
            resources: vec!["stream".to_string()],
            types: vec!["movie".to_string(), "series".to_string()],
            id_prefixes: vec!["tt".to_string()],
            catalogs: Vec::new(),
            behavior_hints: ManifestBehaviorHints {
                configurable: true,
                configuration_required: true,
            },
        }
    }
}
