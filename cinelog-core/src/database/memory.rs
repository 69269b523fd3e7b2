//! In-process repositories with the same insert-if-absent semantics as the
//! Postgres adapters. Used by tests and by the server's development mode.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::application::unit_of_work::AppUnitOfWork;
use crate::database::ports::{
    CatalogRepository, LoadedSeason, WatchRepository, WebhookConfigRepository,
};
use crate::domain::{
    Movie, NewEpisode, NewMovie, NewSeason, NewTvShow, NewWatch, TvShow,
    TvShowEpisode, TvShowSeason, Watch, WatchTarget, WebhookConfig,
};
use crate::error::{CatalogError, Result};

#[derive(Debug, Default)]
struct CatalogTables {
    movies: HashMap<(Uuid, i64), Movie>,
    shows: HashMap<(Uuid, i64), TvShow>,
    seasons: HashMap<(Uuid, i32), TvShowSeason>,
    episodes: HashMap<(Uuid, i32), TvShowEpisode>,
}

impl CatalogTables {
    fn episodes_of(&self, season_id: Uuid) -> Vec<TvShowEpisode> {
        let mut episodes: Vec<TvShowEpisode> = self
            .episodes
            .values()
            .filter(|episode| episode.season_id == season_id)
            .cloned()
            .collect();
        episodes.sort_by_key(|episode| episode.episode_number);
        episodes
    }

    fn add_missing_episodes(&mut self, season_id: Uuid, episodes: Vec<NewEpisode>) {
        let now = Utc::now();
        for episode in episodes {
            self.episodes
                .entry((season_id, episode.episode_number))
                .or_insert_with(|| episode.into_episode(Uuid::now_v7(), season_id, now));
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    tables: Mutex<CatalogTables>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn movie_count(&self) -> usize {
        self.tables.lock().await.movies.len()
    }

    pub async fn show_count(&self) -> usize {
        self.tables.lock().await.shows.len()
    }

    pub async fn season_count(&self) -> usize {
        self.tables.lock().await.seasons.len()
    }

    pub async fn episode_count(&self) -> usize {
        self.tables.lock().await.episodes.len()
    }

    pub async fn episodes(&self) -> Vec<TvShowEpisode> {
        self.tables.lock().await.episodes.values().cloned().collect()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_movie(
        &self,
        user_id: Uuid,
        external_id: i64,
    ) -> Result<Option<Movie>> {
        let tables = self.tables.lock().await;
        Ok(tables.movies.get(&(user_id, external_id)).cloned())
    }

    async fn insert_movie_if_absent(&self, movie: NewMovie) -> Result<Movie> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .movies
            .entry((movie.user_id, movie.external_id))
            .or_insert_with(|| movie.into_movie(Uuid::now_v7(), Utc::now()));
        Ok(stored.clone())
    }

    async fn find_tv_show(
        &self,
        user_id: Uuid,
        external_id: i64,
    ) -> Result<Option<TvShow>> {
        let tables = self.tables.lock().await;
        Ok(tables.shows.get(&(user_id, external_id)).cloned())
    }

    async fn insert_tv_show_if_absent(&self, show: NewTvShow) -> Result<TvShow> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .shows
            .entry((show.user_id, show.external_id))
            .or_insert_with(|| show.into_show(Uuid::now_v7(), Utc::now()));
        Ok(stored.clone())
    }

    async fn find_season(
        &self,
        tv_show_id: Uuid,
        season_number: i32,
    ) -> Result<Option<TvShowSeason>> {
        let tables = self.tables.lock().await;
        Ok(tables.seasons.get(&(tv_show_id, season_number)).cloned())
    }

    async fn insert_season_with_episodes(
        &self,
        season: NewSeason,
        episodes: Vec<NewEpisode>,
    ) -> Result<LoadedSeason> {
        let mut tables = self.tables.lock().await;
        if !tables
            .shows
            .values()
            .any(|show| show.id == season.tv_show_id)
        {
            return Err(CatalogError::NotFound(format!(
                "tv show {}",
                season.tv_show_id
            )));
        }

        let stored = tables
            .seasons
            .entry((season.tv_show_id, season.season_number))
            .or_insert_with(|| season.into_season(Uuid::now_v7(), Utc::now()))
            .clone();
        tables.add_missing_episodes(stored.id, episodes);

        Ok(LoadedSeason {
            episodes: tables.episodes_of(stored.id),
            season: stored,
        })
    }

    async fn list_episodes(&self, season_id: Uuid) -> Result<Vec<TvShowEpisode>> {
        let tables = self.tables.lock().await;
        Ok(tables.episodes_of(season_id))
    }

    async fn insert_episodes_if_absent(
        &self,
        season_id: Uuid,
        episodes: Vec<NewEpisode>,
    ) -> Result<Vec<TvShowEpisode>> {
        let mut tables = self.tables.lock().await;
        if !tables.seasons.values().any(|season| season.id == season_id) {
            return Err(CatalogError::NotFound(format!("season {season_id}")));
        }
        tables.add_missing_episodes(season_id, episodes);
        Ok(tables.episodes_of(season_id))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryWatchRepository {
    watches: Mutex<Vec<Watch>>,
}

impl InMemoryWatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Watch> {
        self.watches.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.watches.lock().await.len()
    }
}

#[async_trait]
impl WatchRepository for InMemoryWatchRepository {
    async fn insert_watch(&self, watch: NewWatch) -> Result<Watch> {
        let watch = watch.into_watch(Uuid::now_v7(), Utc::now());
        self.watches.lock().await.push(watch.clone());
        Ok(watch)
    }

    async fn find_recent_watch(
        &self,
        user_id: Uuid,
        target: &WatchTarget,
        since: DateTime<Utc>,
    ) -> Result<Option<Watch>> {
        let watches = self.watches.lock().await;
        Ok(watches
            .iter()
            .filter(|watch| watch.user_id == user_id)
            .filter(|watch| watch.target.entity_id() == target.entity_id())
            .filter(|watch| watch.watched_at >= since)
            .max_by_key(|watch| watch.watched_at)
            .cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryWebhookConfigRepository {
    configs: Mutex<HashMap<String, WebhookConfig>>,
}

impl InMemoryWebhookConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the config for `user_id`.
    pub async fn insert(
        &self,
        user_id: Uuid,
        api_key: impl Into<String>,
        enabled: bool,
    ) -> WebhookConfig {
        let now = Utc::now();
        let config = WebhookConfig {
            id: Uuid::now_v7(),
            user_id,
            api_key: api_key.into(),
            enabled,
            created_at: now,
            updated_at: now,
        };
        let mut configs = self.configs.lock().await;
        configs.retain(|_, existing| existing.user_id != user_id);
        configs.insert(config.api_key.clone(), config.clone());
        config
    }
}

#[async_trait]
impl WebhookConfigRepository for InMemoryWebhookConfigRepository {
    async fn find_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<WebhookConfig>> {
        Ok(self.configs.lock().await.get(api_key).cloned())
    }
}

/// The three in-memory repositories, kept concrete so callers can inspect
/// them after exercising the pipeline.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    pub catalog: Arc<InMemoryCatalogRepository>,
    pub watches: Arc<InMemoryWatchRepository>,
    pub webhook_configs: Arc<InMemoryWebhookConfigRepository>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit_of_work(&self) -> AppUnitOfWork {
        AppUnitOfWork::new(
            self.catalog.clone(),
            self.watches.clone(),
            self.webhook_configs.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_show(user_id: Uuid) -> NewTvShow {
        NewTvShow {
            user_id,
            external_id: 1399,
            title: "Game of Thrones".into(),
            original_title: None,
            first_air_date: None,
            last_air_date: None,
            status: None,
            network: None,
            genres: vec![],
            cast: vec![],
        }
    }

    #[tokio::test]
    async fn season_batch_only_adds_missing_episodes() {
        let repo = InMemoryCatalogRepository::new();
        let show = repo.insert_tv_show_if_absent(new_show(Uuid::new_v4())).await.unwrap();
        let season = NewSeason {
            tv_show_id: show.id,
            season_number: 1,
            name: None,
            overview: None,
            air_date: None,
            episode_count: None,
            poster_path: None,
        };

        let first = repo
            .insert_season_with_episodes(season.clone(), vec![NewEpisode::stub(1)])
            .await
            .unwrap();
        let second = repo
            .insert_season_with_episodes(
                season,
                vec![NewEpisode::stub(1), NewEpisode::stub(2)],
            )
            .await
            .unwrap();

        assert_eq!(first.season.id, second.season.id);
        assert_eq!(second.episodes.len(), 2);
        assert_eq!(second.episodes[0].id, first.episodes[0].id);
        assert_eq!(repo.season_count().await, 1);
    }

    #[tokio::test]
    async fn season_requires_existing_show() {
        let repo = InMemoryCatalogRepository::new();
        let err = repo
            .insert_season_with_episodes(
                NewSeason {
                    tv_show_id: Uuid::new_v4(),
                    season_number: 1,
                    name: None,
                    overview: None,
                    air_date: None,
                    episode_count: None,
                    poster_path: None,
                },
                vec![],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn replacing_a_users_key_drops_the_old_one() {
        let repo = InMemoryWebhookConfigRepository::new();
        let user = Uuid::new_v4();
        repo.insert(user, "old", true).await;
        repo.insert(user, "new", false).await;

        assert!(repo.find_by_api_key("old").await.unwrap().is_none());
        let current = repo.find_by_api_key("new").await.unwrap().unwrap();
        assert!(!current.enabled);
    }
}
