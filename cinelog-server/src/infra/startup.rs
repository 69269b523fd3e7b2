use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};
use uuid::Uuid;

use crate::infra::{app_state::AppState, config::Config};
use cinelog_core::application::unit_of_work::AppUnitOfWork;
use cinelog_core::database::{InMemoryBackend, PostgresDatabase};
use cinelog_core::providers::{MetadataProvider, TmdbClient, TmdbConfig};
use cinelog_core::webhook::WebhookGateway;

/// Owner of the webhook config seeded in `--in-memory` mode.
pub const DEV_USER_ID: Uuid =
    Uuid::from_u128(0x0000_0000_0000_4000_8000_00c1_e106_0001);

pub fn tmdb_client(config: &Config) -> Result<TmdbClient> {
    let api_key = config.tmdb_api_key()?;
    let tmdb = TmdbConfig::new(api_key)
        .with_base_url(config.tmdb.base_url.clone())
        .with_language(config.tmdb.language.clone())
        .with_timeout(config.tmdb.timeout);
    TmdbClient::new(tmdb).context("failed to build TMDB client")
}

/// Wires the gateway over an already assembled unit of work.
pub fn build_state(
    config: Arc<Config>,
    unit_of_work: Arc<AppUnitOfWork>,
    provider: Arc<dyn MetadataProvider>,
    postgres: Option<Arc<PostgresDatabase>>,
) -> AppState {
    let gateway = WebhookGateway::new(unit_of_work.clone(), provider)
        .with_dedup_window(config.watch.dedup_window);
    if let Some(window) = config.watch.dedup_window {
        info!(window_secs = window.as_secs(), "Watch deduplication enabled");
    }

    AppState {
        gateway: Arc::new(gateway),
        unit_of_work,
        config,
        postgres,
    }
}

pub async fn connect_postgres(config: &Config) -> Result<Arc<PostgresDatabase>> {
    let url = config.database_url()?;
    let db = PostgresDatabase::new(url)
        .await
        .context("failed to connect to PostgreSQL")?;
    Ok(Arc::new(db))
}

pub async fn postgres_state(config: Arc<Config>) -> Result<AppState> {
    let provider: Arc<dyn MetadataProvider> = Arc::new(tmdb_client(&config)?);
    let db = connect_postgres(&config).await?;
    db.initialize_schema()
        .await
        .context("failed to apply database migrations")?;

    let unit_of_work = AppUnitOfWork::from_postgres(db.clone())
        .map_err(|e| anyhow!("failed to assemble unit of work: {e}"))?;

    Ok(build_state(config, Arc::new(unit_of_work), provider, Some(db)))
}

pub async fn in_memory_state(
    config: Arc<Config>,
) -> Result<(AppState, InMemoryBackend)> {
    let provider: Arc<dyn MetadataProvider> = Arc::new(tmdb_client(&config)?);
    let backend = InMemoryBackend::new();

    match config.dev.webhook_api_key.as_deref() {
        Some(key) => {
            backend
                .webhook_configs
                .insert(DEV_USER_ID, key, true)
                .await;
            info!(user_id = %DEV_USER_ID, "Seeded development webhook key");
        }
        None => warn!(
            "DEV_WEBHOOK_API_KEY is not set; every webhook delivery will be rejected"
        ),
    }

    let state = build_state(
        config,
        Arc::new(backend.unit_of_work()),
        provider,
        None,
    );
    Ok((state, backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::{
        ConfigMetadata, DatabaseConfig, DevConfig, ServerConfig, TmdbSettings,
        WatchConfig,
    };
    use std::time::Duration;

    fn config(tmdb_key: Option<&str>, dev_key: Option<&str>) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 3000,
            },
            database: DatabaseConfig::default(),
            tmdb: TmdbSettings {
                api_key: tmdb_key.map(str::to_string),
                base_url: "https://api.themoviedb.org/3".into(),
                language: "en-US".into(),
                timeout: Duration::from_secs(5),
            },
            watch: WatchConfig::default(),
            dev: DevConfig {
                webhook_api_key: dev_key.map(str::to_string),
            },
            metadata: ConfigMetadata::default(),
        }
    }

    #[tokio::test]
    async fn in_memory_mode_seeds_the_dev_key() {
        let (state, _backend) =
            in_memory_state(Arc::new(config(Some("tmdb"), Some("dev-key"))))
                .await
                .unwrap();

        let seeded = state
            .unit_of_work
            .webhook_configs
            .find_by_api_key("dev-key")
            .await
            .unwrap()
            .expect("dev key seeded");
        assert_eq!(seeded.user_id, DEV_USER_ID);
        assert!(seeded.enabled);
        assert!(state.postgres.is_none());
    }

    #[tokio::test]
    async fn tmdb_key_is_required() {
        let err = in_memory_state(Arc::new(config(None, Some("dev-key"))))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("TMDB_API_KEY"));
    }
}
