//! Provider payload → catalog record mapping.
//!
//! Every helper here is total: malformed or missing provider data maps to
//! `None`/empty rather than an error.

use chrono::{DateTime, NaiveDate};
use uuid::Uuid;

use crate::domain::{NewEpisode, NewMovie, NewSeason, NewTvShow};
use crate::providers::{
    CastMember, CrewMember, EpisodeDetails, Genre, MovieDetails, SeasonDetails,
    TvShowDetails,
};

pub const MAX_CAST: usize = 10;
const MIN_RELEASE_YEAR: i32 = 1800;
const MAX_RELEASE_YEAR: i32 = 3000;

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Year from the first four characters of a release date, if plausible.
pub fn release_year(release_date: Option<&str>) -> Option<i32> {
    let prefix: String = release_date?.trim().chars().take(4).collect();
    prefix
        .parse::<i32>()
        .ok()
        .filter(|year| (MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(year))
}

/// `YYYY-MM-DD`, falling back to RFC 3339 timestamps. Anything else is `None`.
pub fn parse_date_lenient(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.date_naive())
    })
}

pub fn director(crew: &[CrewMember]) -> Option<String> {
    crew.iter()
        .filter(|member| {
            member
                .job
                .as_deref()
                .is_some_and(|job| job.trim().eq_ignore_ascii_case("director"))
        })
        .find_map(|member| non_blank(member.name.as_deref()))
}

/// Top-billed names: ascending credit order, unordered entries last, blanks
/// dropped, capped at [`MAX_CAST`].
pub fn cast(members: &[CastMember]) -> Vec<String> {
    let mut billed: Vec<(Option<i32>, String)> = members
        .iter()
        .filter_map(|member| {
            non_blank(member.name.as_deref()).map(|name| (member.order, name))
        })
        .collect();
    billed.sort_by_key(|(order, _)| (order.is_none(), *order));
    billed.into_iter().take(MAX_CAST).map(|(_, name)| name).collect()
}

pub fn genre_names(genres: &[Genre]) -> Vec<String> {
    genres
        .iter()
        .filter_map(|genre| non_blank(Some(genre.name.as_str())))
        .collect()
}

fn title_or_fallback(title: &str, original: Option<&str>, id: i64) -> String {
    non_blank(Some(title))
        .or_else(|| non_blank(original))
        .unwrap_or_else(|| format!("TMDB #{id}"))
}

pub fn map_movie(user_id: Uuid, details: &MovieDetails) -> NewMovie {
    let credits = details.credits.clone().unwrap_or_default();
    NewMovie {
        user_id,
        external_id: details.id,
        title: title_or_fallback(
            &details.title,
            details.original_title.as_deref(),
            details.id,
        ),
        original_title: non_blank(details.original_title.as_deref()),
        release_year: release_year(details.release_date.as_deref()),
        runtime: details.runtime.filter(|minutes| *minutes > 0),
        overview: non_blank(details.overview.as_deref()),
        genres: genre_names(&details.genres),
        director: director(&credits.crew),
        cast: cast(&credits.cast),
    }
}

pub fn map_show(user_id: Uuid, details: &TvShowDetails) -> NewTvShow {
    let credits = details.credits.clone().unwrap_or_default();
    NewTvShow {
        user_id,
        external_id: details.id,
        title: title_or_fallback(
            &details.name,
            details.original_name.as_deref(),
            details.id,
        ),
        original_title: non_blank(details.original_name.as_deref()),
        first_air_date: parse_date_lenient(details.first_air_date.as_deref()),
        last_air_date: parse_date_lenient(details.last_air_date.as_deref()),
        status: non_blank(details.status.as_deref()),
        network: details
            .networks
            .iter()
            .find_map(|network| non_blank(network.name.as_deref())),
        genres: genre_names(&details.genres),
        cast: cast(&credits.cast),
    }
}

pub fn map_season(tv_show_id: Uuid, details: &SeasonDetails) -> NewSeason {
    NewSeason {
        tv_show_id,
        season_number: details.season_number,
        name: non_blank(details.name.as_deref()),
        overview: non_blank(details.overview.as_deref()),
        air_date: parse_date_lenient(details.air_date.as_deref()),
        episode_count: i32::try_from(details.episodes.len()).ok(),
        poster_path: non_blank(details.poster_path.as_deref()),
    }
}

pub fn map_episode(details: &EpisodeDetails) -> NewEpisode {
    NewEpisode {
        episode_number: details.episode_number,
        name: non_blank(details.name.as_deref()),
        overview: non_blank(details.overview.as_deref()),
        air_date: parse_date_lenient(details.air_date.as_deref()),
        runtime: details.runtime.filter(|minutes| *minutes > 0),
        stub: false,
    }
}

pub fn map_episodes(details: &SeasonDetails) -> Vec<NewEpisode> {
    details.episodes.iter().map(map_episode).collect()
}
