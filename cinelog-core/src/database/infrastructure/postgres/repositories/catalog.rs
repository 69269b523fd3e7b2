use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction, postgres::PgRow};
use uuid::Uuid;

use super::column;
use crate::database::ports::{CatalogRepository, LoadedSeason};
use crate::domain::{
    Movie, NewEpisode, NewMovie, NewSeason, NewTvShow, TvShow, TvShowEpisode,
    TvShowSeason,
};
use crate::error::{CatalogError, Result};

const MOVIE_COLUMNS: &str = "id, user_id, external_id, title, original_title, \
    release_year, runtime, overview, genres, director, cast_members, \
    poster_path, created_at";

const SHOW_COLUMNS: &str = "id, user_id, external_id, title, original_title, \
    first_air_date, last_air_date, status, network, genres, cast_members, \
    created_at";

const SEASON_COLUMNS: &str = "id, tv_show_id, season_number, name, overview, \
    air_date, episode_count, poster_path, created_at";

const EPISODE_COLUMNS: &str = "id, season_id, episode_number, name, overview, \
    air_date, runtime, is_stub, created_at";

#[derive(Clone, Debug)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_movie(row: &PgRow) -> Result<Movie> {
        Ok(Movie {
            id: column(row, "id")?,
            user_id: column(row, "user_id")?,
            external_id: column(row, "external_id")?,
            title: column(row, "title")?,
            original_title: column(row, "original_title")?,
            release_year: column(row, "release_year")?,
            runtime: column(row, "runtime")?,
            overview: column(row, "overview")?,
            genres: column(row, "genres")?,
            director: column(row, "director")?,
            cast: column(row, "cast_members")?,
            poster_path: column(row, "poster_path")?,
            created_at: column(row, "created_at")?,
        })
    }

    fn map_show(row: &PgRow) -> Result<TvShow> {
        Ok(TvShow {
            id: column(row, "id")?,
            user_id: column(row, "user_id")?,
            external_id: column(row, "external_id")?,
            title: column(row, "title")?,
            original_title: column(row, "original_title")?,
            first_air_date: column(row, "first_air_date")?,
            last_air_date: column(row, "last_air_date")?,
            status: column(row, "status")?,
            network: column(row, "network")?,
            genres: column(row, "genres")?,
            cast: column(row, "cast_members")?,
            created_at: column(row, "created_at")?,
        })
    }

    fn map_season(row: &PgRow) -> Result<TvShowSeason> {
        Ok(TvShowSeason {
            id: column(row, "id")?,
            tv_show_id: column(row, "tv_show_id")?,
            season_number: column(row, "season_number")?,
            name: column(row, "name")?,
            overview: column(row, "overview")?,
            air_date: column(row, "air_date")?,
            episode_count: column(row, "episode_count")?,
            poster_path: column(row, "poster_path")?,
            created_at: column(row, "created_at")?,
        })
    }

    fn map_episode(row: &PgRow) -> Result<TvShowEpisode> {
        Ok(TvShowEpisode {
            id: column(row, "id")?,
            season_id: column(row, "season_id")?,
            episode_number: column(row, "episode_number")?,
            name: column(row, "name")?,
            overview: column(row, "overview")?,
            air_date: column(row, "air_date")?,
            runtime: column(row, "runtime")?,
            stub: column(row, "is_stub")?,
            created_at: column(row, "created_at")?,
        })
    }

    /// One multi-row insert through `UNNEST`; conflicting episode numbers
    /// are left untouched.
    async fn insert_episode_batch(
        tx: &mut Transaction<'_, Postgres>,
        season_id: Uuid,
        episodes: Vec<NewEpisode>,
    ) -> Result<()> {
        if episodes.is_empty() {
            return Ok(());
        }

        let mut ids = Vec::with_capacity(episodes.len());
        let mut numbers = Vec::with_capacity(episodes.len());
        let mut names: Vec<Option<String>> = Vec::with_capacity(episodes.len());
        let mut overviews: Vec<Option<String>> =
            Vec::with_capacity(episodes.len());
        let mut air_dates: Vec<Option<NaiveDate>> =
            Vec::with_capacity(episodes.len());
        let mut runtimes: Vec<Option<i32>> = Vec::with_capacity(episodes.len());
        let mut stubs = Vec::with_capacity(episodes.len());
        for episode in episodes {
            ids.push(Uuid::now_v7());
            numbers.push(episode.episode_number);
            names.push(episode.name);
            overviews.push(episode.overview);
            air_dates.push(episode.air_date);
            runtimes.push(episode.runtime);
            stubs.push(episode.stub);
        }

        sqlx::query(
            r#"
            INSERT INTO tv_show_episodes (
                id, season_id, episode_number, name, overview, air_date,
                runtime, is_stub
            )
            SELECT u.id, $2, u.episode_number, u.name, u.overview, u.air_date,
                u.runtime, u.is_stub
            FROM UNNEST(
                $1::uuid[], $3::int4[], $4::text[], $5::text[], $6::date[],
                $7::int4[], $8::bool[]
            ) AS u(id, episode_number, name, overview, air_date, runtime, is_stub)
            ON CONFLICT (season_id, episode_number) DO NOTHING
            "#,
        )
        .bind(ids)
        .bind(season_id)
        .bind(numbers)
        .bind(names)
        .bind(overviews)
        .bind(air_dates)
        .bind(runtimes)
        .bind(stubs)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            CatalogError::Internal(format!("Failed to insert episodes: {e}"))
        })?;

        Ok(())
    }

    async fn episodes_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        season_id: Uuid,
    ) -> Result<Vec<TvShowEpisode>> {
        let rows = sqlx::query(&format!(
            "SELECT {EPISODE_COLUMNS} FROM tv_show_episodes \
             WHERE season_id = $1 ORDER BY episode_number"
        ))
        .bind(season_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| {
            CatalogError::Internal(format!("Failed to list episodes: {e}"))
        })?;

        rows.iter().map(Self::map_episode).collect()
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        self.pool().begin().await.map_err(|e| {
            CatalogError::Internal(format!("Failed to start transaction: {e}"))
        })
    }

    async fn commit(tx: Transaction<'_, Postgres>) -> Result<()> {
        tx.commit().await.map_err(|e| {
            CatalogError::Internal(format!("Failed to commit transaction: {e}"))
        })
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn find_movie(
        &self,
        user_id: Uuid,
        external_id: i64,
    ) -> Result<Option<Movie>> {
        let row = sqlx::query(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies \
             WHERE user_id = $1 AND external_id = $2"
        ))
        .bind(user_id)
        .bind(external_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CatalogError::Internal(format!("Failed to load movie: {e}")))?;

        row.as_ref().map(Self::map_movie).transpose()
    }

    async fn insert_movie_if_absent(&self, movie: NewMovie) -> Result<Movie> {
        let (user_id, external_id) = (movie.user_id, movie.external_id);
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO movies (
                id, user_id, external_id, title, original_title, release_year,
                runtime, overview, genres, director, cast_members
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id, external_id) DO NOTHING
            RETURNING {MOVIE_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(movie.user_id)
        .bind(movie.external_id)
        .bind(movie.title)
        .bind(movie.original_title)
        .bind(movie.release_year)
        .bind(movie.runtime)
        .bind(movie.overview)
        .bind(movie.genres)
        .bind(movie.director)
        .bind(movie.cast)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CatalogError::Internal(format!("Failed to insert movie: {e}")))?;

        match row {
            Some(row) => Self::map_movie(&row),
            None => self.find_movie(user_id, external_id).await?.ok_or_else(|| {
                CatalogError::Internal(format!(
                    "movie {external_id} conflicted but could not be re-read"
                ))
            }),
        }
    }

    async fn find_tv_show(
        &self,
        user_id: Uuid,
        external_id: i64,
    ) -> Result<Option<TvShow>> {
        let row = sqlx::query(&format!(
            "SELECT {SHOW_COLUMNS} FROM tv_shows \
             WHERE user_id = $1 AND external_id = $2"
        ))
        .bind(user_id)
        .bind(external_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CatalogError::Internal(format!("Failed to load tv show: {e}")))?;

        row.as_ref().map(Self::map_show).transpose()
    }

    async fn insert_tv_show_if_absent(&self, show: NewTvShow) -> Result<TvShow> {
        let (user_id, external_id) = (show.user_id, show.external_id);
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO tv_shows (
                id, user_id, external_id, title, original_title, first_air_date,
                last_air_date, status, network, genres, cast_members
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id, external_id) DO NOTHING
            RETURNING {SHOW_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(show.user_id)
        .bind(show.external_id)
        .bind(show.title)
        .bind(show.original_title)
        .bind(show.first_air_date)
        .bind(show.last_air_date)
        .bind(show.status)
        .bind(show.network)
        .bind(show.genres)
        .bind(show.cast)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CatalogError::Internal(format!("Failed to insert tv show: {e}")))?;

        match row {
            Some(row) => Self::map_show(&row),
            None => self.find_tv_show(user_id, external_id).await?.ok_or_else(|| {
                CatalogError::Internal(format!(
                    "tv show {external_id} conflicted but could not be re-read"
                ))
            }),
        }
    }

    async fn find_season(
        &self,
        tv_show_id: Uuid,
        season_number: i32,
    ) -> Result<Option<TvShowSeason>> {
        let row = sqlx::query(&format!(
            "SELECT {SEASON_COLUMNS} FROM tv_show_seasons \
             WHERE tv_show_id = $1 AND season_number = $2"
        ))
        .bind(tv_show_id)
        .bind(season_number)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CatalogError::Internal(format!("Failed to load season: {e}")))?;

        row.as_ref().map(Self::map_season).transpose()
    }

    async fn insert_season_with_episodes(
        &self,
        season: NewSeason,
        episodes: Vec<NewEpisode>,
    ) -> Result<LoadedSeason> {
        let (tv_show_id, season_number) = (season.tv_show_id, season.season_number);
        let mut tx = self.begin().await?;

        let inserted = sqlx::query(&format!(
            r#"
            INSERT INTO tv_show_seasons (
                id, tv_show_id, season_number, name, overview, air_date,
                episode_count, poster_path
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (tv_show_id, season_number) DO NOTHING
            RETURNING {SEASON_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(season.tv_show_id)
        .bind(season.season_number)
        .bind(season.name)
        .bind(season.overview)
        .bind(season.air_date)
        .bind(season.episode_count)
        .bind(season.poster_path)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| CatalogError::Internal(format!("Failed to insert season: {e}")))?;

        let row = match inserted {
            Some(row) => row,
            None => sqlx::query(&format!(
                "SELECT {SEASON_COLUMNS} FROM tv_show_seasons \
                 WHERE tv_show_id = $1 AND season_number = $2"
            ))
            .bind(tv_show_id)
            .bind(season_number)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                CatalogError::Internal(format!(
                    "Season {season_number} conflicted but could not be re-read: {e}"
                ))
            })?,
        };
        let stored = Self::map_season(&row)?;

        Self::insert_episode_batch(&mut tx, stored.id, episodes).await?;
        let episodes = Self::episodes_in_tx(&mut tx, stored.id).await?;
        Self::commit(tx).await?;

        Ok(LoadedSeason {
            season: stored,
            episodes,
        })
    }

    async fn list_episodes(&self, season_id: Uuid) -> Result<Vec<TvShowEpisode>> {
        let rows = sqlx::query(&format!(
            "SELECT {EPISODE_COLUMNS} FROM tv_show_episodes \
             WHERE season_id = $1 ORDER BY episode_number"
        ))
        .bind(season_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| CatalogError::Internal(format!("Failed to list episodes: {e}")))?;

        rows.iter().map(Self::map_episode).collect()
    }

    async fn insert_episodes_if_absent(
        &self,
        season_id: Uuid,
        episodes: Vec<NewEpisode>,
    ) -> Result<Vec<TvShowEpisode>> {
        let mut tx = self.begin().await?;
        Self::insert_episode_batch(&mut tx, season_id, episodes).await?;
        let episodes = Self::episodes_in_tx(&mut tx, season_id).await?;
        Self::commit(tx).await?;
        Ok(episodes)
    }
}
