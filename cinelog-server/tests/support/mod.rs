#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use cinelog_core::database::InMemoryBackend;
use cinelog_core::providers::{
    Credits, CrewMember, EpisodeDetails, MetadataProvider, MovieDetails,
    ProviderError, SeasonDetails, TvShowDetails,
};
use cinelog_server::create_app;
use cinelog_server::infra::config::{
    Config, ConfigMetadata, DatabaseConfig, DevConfig, ServerConfig,
    TmdbSettings, WatchConfig,
};
use cinelog_server::infra::startup;
use uuid::Uuid;

pub const API_KEY: &str = "server-test-key";
pub const DISABLED_KEY: &str = "server-disabled-key";

/// Canned provider: The Matrix (603) and one season of Severance (95396).
#[derive(Default)]
pub struct CannedProvider {
    movies: HashMap<i64, MovieDetails>,
    shows: HashMap<i64, TvShowDetails>,
    seasons: HashMap<(i64, i32), SeasonDetails>,
}

impl CannedProvider {
    pub fn new() -> Self {
        let mut provider = Self::default();
        provider.movies.insert(
            603,
            MovieDetails {
                id: 603,
                title: "The Matrix".into(),
                release_date: Some("1999-03-30".into()),
                credits: Some(Credits {
                    cast: Vec::new(),
                    crew: vec![CrewMember {
                        name: Some("Lilly Wachowski".into()),
                        job: Some("Director".into()),
                        department: Some("Directing".into()),
                    }],
                }),
                ..Default::default()
            },
        );
        provider.shows.insert(
            95396,
            TvShowDetails {
                id: 95396,
                name: "Severance".into(),
                ..Default::default()
            },
        );
        provider.seasons.insert(
            (95396, 1),
            SeasonDetails {
                season_number: 1,
                name: Some("Season 1".into()),
                episodes: (1..=3)
                    .map(|n| EpisodeDetails {
                        episode_number: n,
                        name: Some(format!("Episode {n}")),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            },
        );
        provider
    }
}

#[async_trait]
impl MetadataProvider for CannedProvider {
    async fn get_movie(&self, id: i64) -> Result<MovieDetails, ProviderError> {
        self.movies.get(&id).cloned().ok_or(ProviderError::NotFound {
            resource: format!("movie {id}"),
        })
    }

    async fn get_tv_show(&self, id: i64) -> Result<TvShowDetails, ProviderError> {
        self.shows.get(&id).cloned().ok_or(ProviderError::NotFound {
            resource: format!("tv show {id}"),
        })
    }

    async fn get_tv_season(
        &self,
        id: i64,
        season_number: i32,
    ) -> Result<SeasonDetails, ProviderError> {
        self.seasons
            .get(&(id, season_number))
            .cloned()
            .ok_or(ProviderError::NotFound {
                resource: format!("tv show {id} season {season_number}"),
            })
    }
}

pub fn test_config(dedup_window: Option<Duration>) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig::default(),
        tmdb: TmdbSettings {
            api_key: Some("unused".into()),
            base_url: "http://127.0.0.1:9".into(),
            language: "en-US".into(),
            timeout: Duration::from_secs(1),
        },
        watch: WatchConfig { dedup_window },
        dev: DevConfig::default(),
        metadata: ConfigMetadata::default(),
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub backend: InMemoryBackend,
    pub user_id: Uuid,
}

pub async fn test_app() -> TestApp {
    test_app_with(test_config(None)).await
}

pub async fn test_app_with(config: Config) -> TestApp {
    let backend = InMemoryBackend::new();
    let user_id = Uuid::new_v4();
    backend
        .webhook_configs
        .insert(user_id, API_KEY, true)
        .await;
    backend
        .webhook_configs
        .insert(Uuid::new_v4(), DISABLED_KEY, false)
        .await;

    let state = startup::build_state(
        Arc::new(config),
        Arc::new(backend.unit_of_work()),
        Arc::new(CannedProvider::new()),
        None,
    );
    let server = TestServer::new(create_app(state)).unwrap();

    TestApp {
        server,
        backend,
        user_id,
    }
}

pub fn movie_payload(percent: u64) -> serde_json::Value {
    serde_json::json!({
        "tmdbId": "603",
        "totalRunTimeInTicks": "10000000000",
        "currentRunTimeInTicks": (percent * 100_000_000).to_string(),
    })
}

pub fn episode_payload(season: i32, episode: i32) -> serde_json::Value {
    serde_json::json!({
        "tmdbId": 95396,
        "seasonNumber": season,
        "episodeNumber": episode,
        "totalRunTimeInTicks": 1000,
        "currentRunTimeInTicks": 900,
    })
}
