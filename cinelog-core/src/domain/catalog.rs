use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uniqueness tuple for each catalog level.
///
/// Movies and shows are scoped per user; seasons hang off a show and episodes
/// off a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    Movie { user_id: Uuid, external_id: i64 },
    TvShow { user_id: Uuid, external_id: i64 },
    Season { tv_show_id: Uuid, season_number: i32 },
    Episode { season_id: Uuid, episode_number: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub user_id: Uuid,
    pub external_id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub release_year: Option<i32>,
    pub runtime: Option<i32>,
    pub overview: Option<String>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub cast: Vec<String>,
    /// Filled later by the poster backfill; always `None` on creation.
    pub poster_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Movie {
    pub fn key(&self) -> CatalogKey {
        CatalogKey::Movie {
            user_id: self.user_id,
            external_id: self.external_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub user_id: Uuid,
    pub external_id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub release_year: Option<i32>,
    pub runtime: Option<i32>,
    pub overview: Option<String>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub cast: Vec<String>,
}

impl NewMovie {
    pub fn into_movie(self, id: Uuid, created_at: DateTime<Utc>) -> Movie {
        Movie {
            id,
            user_id: self.user_id,
            external_id: self.external_id,
            title: self.title,
            original_title: self.original_title,
            release_year: self.release_year,
            runtime: self.runtime,
            overview: self.overview,
            genres: self.genres,
            director: self.director,
            cast: self.cast,
            poster_path: None,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvShow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub external_id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub first_air_date: Option<NaiveDate>,
    pub last_air_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub network: Option<String>,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl TvShow {
    pub fn key(&self) -> CatalogKey {
        CatalogKey::TvShow {
            user_id: self.user_id,
            external_id: self.external_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTvShow {
    pub user_id: Uuid,
    pub external_id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub first_air_date: Option<NaiveDate>,
    pub last_air_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub network: Option<String>,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
}

impl NewTvShow {
    pub fn into_show(self, id: Uuid, created_at: DateTime<Utc>) -> TvShow {
        TvShow {
            id,
            user_id: self.user_id,
            external_id: self.external_id,
            title: self.title,
            original_title: self.original_title,
            first_air_date: self.first_air_date,
            last_air_date: self.last_air_date,
            status: self.status,
            network: self.network,
            genres: self.genres,
            cast: self.cast,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvShowSeason {
    pub id: Uuid,
    pub tv_show_id: Uuid,
    pub season_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub episode_count: Option<i32>,
    pub poster_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSeason {
    pub tv_show_id: Uuid,
    pub season_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub episode_count: Option<i32>,
    pub poster_path: Option<String>,
}

impl NewSeason {
    pub fn into_season(
        self,
        id: Uuid,
        created_at: DateTime<Utc>,
    ) -> TvShowSeason {
        TvShowSeason {
            id,
            tv_show_id: self.tv_show_id,
            season_number: self.season_number,
            name: self.name,
            overview: self.overview,
            air_date: self.air_date,
            episode_count: self.episode_count,
            poster_path: self.poster_path,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvShowEpisode {
    pub id: Uuid,
    pub season_id: Uuid,
    pub episode_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub runtime: Option<i32>,
    /// Created locally because the provider had no such episode.
    pub stub: bool,
    pub created_at: DateTime<Utc>,
}

impl TvShowEpisode {
    pub fn is_stub(&self) -> bool {
        self.stub
    }
}

/// Episode row to insert. The owning season is supplied separately because
/// episodes are usually created in the same batch as their season.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEpisode {
    pub episode_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub runtime: Option<i32>,
    pub stub: bool,
}

impl NewEpisode {
    pub fn stub(episode_number: i32) -> Self {
        Self {
            episode_number,
            name: None,
            overview: None,
            air_date: None,
            runtime: None,
            stub: true,
        }
    }

    pub fn into_episode(
        self,
        id: Uuid,
        season_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> TvShowEpisode {
        TvShowEpisode {
            id,
            season_id,
            episode_number: self.episode_number,
            name: self.name,
            overview: self.overview,
            air_date: self.air_date,
            runtime: self.runtime,
            stub: self.stub,
            created_at,
        }
    }
}
