use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Movie, NewEpisode, NewMovie, NewSeason, NewTvShow, TvShow, TvShowEpisode,
    TvShowSeason,
};
use crate::error::Result;

/// A season together with every episode stored for it, ordered by episode
/// number.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSeason {
    pub season: TvShowSeason,
    pub episodes: Vec<TvShowEpisode>,
}

impl LoadedSeason {
    pub fn find_episode(&self, episode_number: i32) -> Option<&TvShowEpisode> {
        self.episodes
            .iter()
            .find(|episode| episode.episode_number == episode_number)
    }
}

/// Catalog persistence keyed by the uniqueness tuples of each level.
///
/// Every `insert_*` method is an atomic insert-if-absent: when a row with the
/// same key already exists (including one created concurrently by another
/// delivery) the existing row is returned and nothing is written.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_movie(
        &self,
        user_id: Uuid,
        external_id: i64,
    ) -> Result<Option<Movie>>;

    async fn insert_movie_if_absent(&self, movie: NewMovie) -> Result<Movie>;

    async fn find_tv_show(
        &self,
        user_id: Uuid,
        external_id: i64,
    ) -> Result<Option<TvShow>>;

    async fn insert_tv_show_if_absent(&self, show: NewTvShow) -> Result<TvShow>;

    async fn find_season(
        &self,
        tv_show_id: Uuid,
        season_number: i32,
    ) -> Result<Option<TvShowSeason>>;

    /// Create a season and all of its episodes in one batch. If the season
    /// already exists only the missing episodes are added.
    async fn insert_season_with_episodes(
        &self,
        season: NewSeason,
        episodes: Vec<NewEpisode>,
    ) -> Result<LoadedSeason>;

    async fn list_episodes(&self, season_id: Uuid) -> Result<Vec<TvShowEpisode>>;

    /// Add the given episodes to an existing season, skipping episode numbers
    /// already stored. Returns the full episode list afterwards.
    async fn insert_episodes_if_absent(
        &self,
        season_id: Uuid,
        episodes: Vec<NewEpisode>,
    ) -> Result<Vec<TvShowEpisode>>;
}
