pub mod addon;
pub mod config;
pub mod debrid;
pub mod gateway;
pub mod testing;

pub use addon::{BehaviorHints, Manifest, StreamEntry, StreamsResponse};
pub use config::{
    load_config, load_config_from_str, validate_config, AddonConfig, Config, ConfigError,
    GatewayConfig, RateLimitConfig, ServerConfig, UserConfig,
};
pub use debrid::{
    ClientRegistry, DebridClient, DebridError, ItemFile, ItemKind, ItemPayload, OwnedItem,
    ResolutionStrategy, StandardRegistry,
};
pub use gateway::{list_streams, resolve_direct_url};
