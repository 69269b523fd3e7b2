#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cinelog_core::database::InMemoryBackend;
use cinelog_core::providers::{
    CastMember, Credits, CrewMember, EpisodeDetails, Genre, MetadataProvider,
    MovieDetails, Network, ProviderError, SeasonDetails, TvShowDetails,
};
use cinelog_core::webhook::WebhookGateway;
use uuid::Uuid;

pub const API_KEY: &str = "test-webhook-key";
pub const DISABLED_KEY: &str = "disabled-webhook-key";

/// Canned TMDB catalog with call counters. Unknown ids answer 404.
#[derive(Default)]
pub struct StubProvider {
    pub movies: HashMap<i64, MovieDetails>,
    pub shows: HashMap<i64, TvShowDetails>,
    /// Mutable so a test can publish episodes between deliveries.
    pub seasons: Mutex<HashMap<(i64, i32), SeasonDetails>>,
    pub latency: Option<Duration>,
    pub movie_calls: AtomicUsize,
    pub show_calls: AtomicUsize,
    pub season_calls: AtomicUsize,
}

impl StubProvider {
    pub fn with_matrix(mut self) -> Self {
        self.movies.insert(603, matrix());
        self
    }

    pub fn with_show(mut self, id: i64, season_number: i32, episodes: &[i32]) -> Self {
        self.shows.insert(
            id,
            TvShowDetails {
                id,
                name: "Severance".into(),
                first_air_date: Some("2022-02-18".into()),
                status: Some("Returning Series".into()),
                networks: vec![Network {
                    id: 2552,
                    name: Some("Apple TV+".into()),
                }],
                genres: vec![Genre {
                    id: 18,
                    name: "Drama".into(),
                }],
                ..Default::default()
            },
        );
        self.seasons
            .get_mut()
            .unwrap()
            .insert((id, season_number), season(season_number, episodes));
        self
    }

    /// Replace the episode list the provider reports for a season.
    pub fn publish_season(&self, id: i64, season_number: i32, episodes: &[i32]) {
        self.seasons
            .lock()
            .unwrap()
            .insert((id, season_number), season(season_number, episodes));
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.movie_calls.load(Ordering::SeqCst),
            self.show_calls.load(Ordering::SeqCst),
            self.season_calls.load(Ordering::SeqCst),
        )
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl MetadataProvider for StubProvider {
    async fn get_movie(&self, id: i64) -> Result<MovieDetails, ProviderError> {
        self.movie_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.movies.get(&id).cloned().ok_or(ProviderError::NotFound {
            resource: format!("movie {id}"),
        })
    }

    async fn get_tv_show(&self, id: i64) -> Result<TvShowDetails, ProviderError> {
        self.show_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.shows.get(&id).cloned().ok_or(ProviderError::NotFound {
            resource: format!("tv show {id}"),
        })
    }

    async fn get_tv_season(
        &self,
        id: i64,
        season_number: i32,
    ) -> Result<SeasonDetails, ProviderError> {
        self.season_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.seasons
            .lock()
            .unwrap()
            .get(&(id, season_number))
            .cloned()
            .ok_or(ProviderError::NotFound {
                resource: format!("tv show {id} season {season_number}"),
            })
    }
}

pub fn matrix() -> MovieDetails {
    MovieDetails {
        id: 603,
        title: "The Matrix".into(),
        original_title: Some("The Matrix".into()),
        release_date: Some("1999-03-30".into()),
        runtime: Some(136),
        overview: Some("A hacker learns the truth about reality.".into()),
        genres: vec![
            Genre {
                id: 28,
                name: "Action".into(),
            },
            Genre {
                id: 878,
                name: "Science Fiction".into(),
            },
        ],
        credits: Some(Credits {
            cast: vec![
                CastMember {
                    name: Some("Carrie-Anne Moss".into()),
                    character: Some("Trinity".into()),
                    order: Some(2),
                },
                CastMember {
                    name: Some("Keanu Reeves".into()),
                    character: Some("Neo".into()),
                    order: Some(0),
                },
                CastMember {
                    name: Some("Laurence Fishburne".into()),
                    character: Some("Morpheus".into()),
                    order: Some(1),
                },
            ],
            crew: vec![
                CrewMember {
                    name: Some("Bill Pope".into()),
                    job: Some("Director of Photography".into()),
                    department: Some("Camera".into()),
                },
                CrewMember {
                    name: Some("Lana Wachowski".into()),
                    job: Some("Director".into()),
                    department: Some("Directing".into()),
                },
            ],
        }),
        ..Default::default()
    }
}

pub fn season(season_number: i32, episodes: &[i32]) -> SeasonDetails {
    SeasonDetails {
        season_number,
        name: Some(format!("Season {season_number}")),
        air_date: Some("2022-02-18".into()),
        episodes: episodes
            .iter()
            .map(|&n| EpisodeDetails {
                episode_number: n,
                name: Some(format!("Episode {n}")),
                runtime: Some(55),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

pub struct Harness {
    pub backend: InMemoryBackend,
    pub provider: Arc<StubProvider>,
    pub gateway: WebhookGateway,
    pub user_id: Uuid,
}

pub async fn harness(provider: StubProvider) -> Harness {
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

    let provider = Arc::new(provider);
    let gateway =
        WebhookGateway::new(Arc::new(backend.unit_of_work()), provider.clone());

    Harness {
        backend,
        provider,
        gateway,
        user_id,
    }
}

pub fn movie_body(tmdb_id: &str, total: u64, position: u64) -> Vec<u8> {
    serde_json::json!({
        "tmdbId": tmdb_id,
        "totalRunTimeInTicks": total.to_string(),
        "currentRunTimeInTicks": position.to_string(),
    })
    .to_string()
    .into_bytes()
}

pub fn episode_body(show_id: i64, season: i32, episode: i32, percent: u64) -> Vec<u8> {
    serde_json::json!({
        "tmdbId": show_id,
        "seasonNumber": season,
        "episodeNumber": episode,
        "totalRunTimeInTicks": 100,
        "currentRunTimeInTicks": percent,
    })
    .to_string()
    .into_bytes()
}
