use std::path::PathBuf;
use std::time::Duration;

use super::loader::ConfigLoadError;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub tmdb: TmdbSettings,
    pub watch: WatchConfig,
    pub dev: DevConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone)]
pub struct TmdbSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for TmdbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchConfig {
    /// `None` keeps one watch row per accepted delivery.
    pub dedup_window: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct DevConfig {
    /// Seeded as an enabled webhook key when serving from memory.
    pub webhook_api_key: Option<String>,
}

impl std::fmt::Debug for DevConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevConfig")
            .field(
                "webhook_api_key",
                &self.webhook_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

impl Config {
    pub fn database_url(&self) -> Result<&str, ConfigLoadError> {
        self.database
            .url
            .as_deref()
            .ok_or(ConfigLoadError::MissingSetting {
                name: "DATABASE_URL",
            })
    }

    pub fn tmdb_api_key(&self) -> Result<&str, ConfigLoadError> {
        self.tmdb
            .api_key
            .as_deref()
            .ok_or(ConfigLoadError::MissingSetting {
                name: "TMDB_API_KEY",
            })
    }
}
