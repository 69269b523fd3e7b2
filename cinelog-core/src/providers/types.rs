//! Response shapes for the TMDB v3 endpoints the resolver consumes. Only the
//! fields that end up in the catalog are modelled; everything else is
//! ignored by serde.

use serde::{Deserialize, Deserializer};

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CastMember {
    pub name: Option<String>,
    pub character: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CrewMember {
    pub name: Option<String>,
    pub job: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Credits {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cast: Vec<CastMember>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovieDetails {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub original_title: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i32>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub credits: Option<Credits>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub id: i64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TvShowDetails {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub original_name: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub networks: Vec<Network>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub credits: Option<Credits>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EpisodeDetails {
    pub episode_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub runtime: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SeasonDetails {
    pub season_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub episodes: Vec<EpisodeDetails>,
}

impl SeasonDetails {
    pub fn find_episode(&self, episode_number: i32) -> Option<&EpisodeDetails> {
        self.episodes
            .iter()
            .find(|episode| episode.episode_number == episode_number)
    }
}
