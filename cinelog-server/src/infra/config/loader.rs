use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::{
    models::{
        Config, ConfigMetadata, DatabaseConfig, DevConfig, ServerConfig,
        TmdbSettings, WatchConfig,
    },
    sources::{EnvConfig, FileConfig},
};
use cinelog_core::providers::tmdb::TMDB_BASE_URL;

const DEFAULT_CONFIG_LOCATIONS: &[&str] =
    &["cinelog.toml", "config/cinelog.toml"];
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TMDB_LANGUAGE: &str = "en-US";
const DEFAULT_TMDB_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Loads `.env` and the TOML file. Process environment variables take
    /// precedence over the file, which takes precedence over defaults.
    pub fn load(&self) -> Result<Config, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.load_from(EnvConfig::gather(), env_file_loaded)
    }

    /// Same as [`ConfigLoader::load`] with an already gathered environment.
    pub fn load_from(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<Config, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        if config_path.is_none() {
            debug!("No cinelog.toml detected; using environment variables");
        }
        compose_config(
            file_config.unwrap_or_default(),
            env,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) = if let Some(path) = &self.options.config_path {
            (path.clone(), true)
        } else if let Some(path) = &env.config_path {
            (path.clone(), true)
        } else {
            match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => (path, false),
                None => return Ok((None, None)),
            }
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Environment wins over the file, the file wins over defaults.
fn compose_config(
    file: FileConfig,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<Config, ConfigLoadError> {
    let FileConfig {
        server: file_server,
        database: file_database,
        tmdb: file_tmdb,
        watch: file_watch,
    } = file;

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: parse_env("SERVER_PORT", env.server_port.as_deref())?
            .or(file_server.port)
            .unwrap_or(DEFAULT_PORT),
    };

    let database = DatabaseConfig {
        url: env
            .database_url
            .or(file_database.url)
            .filter(|url| !url.trim().is_empty())
            .map(|url| validate_database_url(&url))
            .transpose()?,
    };

    let tmdb = TmdbSettings {
        api_key: env.tmdb_api_key.or(file_tmdb.api_key),
        base_url: env
            .tmdb_base_url
            .or(file_tmdb.base_url)
            .unwrap_or_else(|| TMDB_BASE_URL.to_string()),
        language: env
            .tmdb_language
            .or(file_tmdb.language)
            .unwrap_or_else(|| DEFAULT_TMDB_LANGUAGE.to_string()),
        timeout: Duration::from_secs(
            parse_env("TMDB_TIMEOUT_SECS", env.tmdb_timeout_secs.as_deref())?
                .or(file_tmdb.timeout_secs)
                .unwrap_or(DEFAULT_TMDB_TIMEOUT_SECS),
        ),
    };

    let dedup_secs: Option<u64> = parse_env(
        "WATCH_DEDUP_WINDOW_SECS",
        env.watch_dedup_window_secs.as_deref(),
    )?
    .or(file_watch.dedup_window_secs);
    let watch = WatchConfig {
        dedup_window: dedup_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
    };

    let dev = DevConfig {
        webhook_api_key: env.dev_webhook_api_key,
    };

    Ok(Config {
        server,
        database,
        tmdb,
        watch,
        dev,
        metadata,
    })
}

fn parse_env<T: FromStr>(
    name: &'static str,
    raw: Option<&str>,
) -> Result<Option<T>, ConfigLoadError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigLoadError::InvalidValue {
                name,
                value: value.to_string(),
            })
    })
    .transpose()
}

fn validate_database_url(raw: &str) -> Result<String, ConfigLoadError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
    match parsed.scheme() {
        "postgres" | "postgresql" => Ok(trimmed.to_string()),
        other => Err(ConfigLoadError::UnsupportedDatabaseScheme {
            scheme: other.to_string(),
        }),
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported database scheme '{scheme}', expected postgres")]
    UnsupportedDatabaseScheme { scheme: String },
    #[error("{name} is required")]
    MissingSetting { name: &'static str },
    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
