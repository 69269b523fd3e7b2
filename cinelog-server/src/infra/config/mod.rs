//! Configuration: `.env`, an optional TOML file, then environment overrides.

pub mod loader;
pub mod models;
pub mod sources;

pub use loader::{ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    Config, ConfigMetadata, DatabaseConfig, DevConfig, ServerConfig,
    TmdbSettings, WatchConfig,
};
