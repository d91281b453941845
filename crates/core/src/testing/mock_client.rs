//! Mock debrid client and registry for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::addon::StreamEntry;
use crate::debrid::{
    format_stream_entry, ClientRegistry, DebridClient, DebridError, OwnedItem, ResolutionStrategy,
};

/// Mock implementation of the `DebridClient` trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable owned items (the real matching engine still
///   filters them)
/// - Simulate listing failures
/// - Map resolution strategies to minted URLs
/// - Count listing and resolve calls for assertions
#[derive(Clone)]
pub struct MockDebridClient {
    /// API key, stamped by the registry on creation.
    pub api_key: String,
    strategies: &'static [ResolutionStrategy],
    items: Arc<RwLock<Vec<OwnedItem>>>,
    list_error: Arc<RwLock<Option<DebridError>>>,
    resolved: Arc<RwLock<HashMap<ResolutionStrategy, String>>>,
    list_calls: Arc<AtomicUsize>,
    resolve_calls: Arc<AtomicUsize>,
}

impl Default for MockDebridClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDebridClient {
    pub fn new() -> Self {
        Self {
            api_key: String::new(),
            strategies: &[ResolutionStrategy::Torrent],
            items: Arc::new(RwLock::new(Vec::new())),
            list_error: Arc::new(RwLock::new(None)),
            resolved: Arc::new(RwLock::new(HashMap::new())),
            list_calls: Arc::new(AtomicUsize::new(0)),
            resolve_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the items every listing returns.
    pub fn with_items(self, items: Vec<OwnedItem>) -> Self {
        *self.items.write().unwrap() = items;
        self
    }

    /// Make the next listing fail with the given error.
    pub fn with_list_error(self, error: DebridError) -> Self {
        *self.list_error.write().unwrap() = Some(error);
        self
    }

    /// Declare the supported resolution strategies.
    pub fn with_strategies(mut self, strategies: &'static [ResolutionStrategy]) -> Self {
        self.strategies = strategies;
        self
    }

    /// Make the given strategy resolve every item to `url`.
    pub fn with_resolved(self, strategy: ResolutionStrategy, url: &str) -> Self {
        self.resolved
            .write()
            .unwrap()
            .insert(strategy, url.to_string());
        self
    }

    /// Number of listings performed.
    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of resolve attempts performed.
    pub fn resolve_count(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DebridClient for MockDebridClient {
    fn provider_name(&self) -> &'static str {
        "mockdebrid"
    }

    fn short_tag(&self) -> &'static str {
        "MK"
    }

    fn strategies(&self) -> &'static [ResolutionStrategy] {
        self.strategies
    }

    async fn list_owned_items(&self) -> Result<Vec<OwnedItem>, DebridError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.list_error.write().unwrap().take() {
            return Err(error);
        }
        Ok(self.items.read().unwrap().clone())
    }

    async fn resolve_file(
        &self,
        strategy: ResolutionStrategy,
        _item_id: &str,
        _file_index: usize,
    ) -> Result<Option<String>, DebridError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.resolved.read().unwrap().get(&strategy).cloned())
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

/// Mock registry handing out clones of one configured mock client.
///
/// With no client configured, every lookup fails with
/// `UnsupportedProvider`, mirroring an unknown name in the real registry.
#[derive(Clone, Default)]
pub struct MockRegistry {
    client: Option<MockDebridClient>,
    creates: Arc<AtomicUsize>,
}

impl MockRegistry {
    pub fn with_client(client: MockDebridClient) -> Self {
        Self {
            client: Some(client),
            creates: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of client lookups performed.
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

impl ClientRegistry for MockRegistry {
    fn create(&self, provider: &str, api_key: &str) -> Result<Box<dyn DebridClient>, DebridError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        match &self.client {
            Some(client) => {
                let mut client = client.clone();
                client.api_key = api_key.to_string();
                Ok(Box::new(client))
            }
            None => Err(DebridError::UnsupportedProvider(provider.to_string())),
        }
    }
}
