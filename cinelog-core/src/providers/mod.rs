//! External metadata providers (TMDB integration)

pub mod tmdb;
pub mod types;

use async_trait::async_trait;

pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::{
    CastMember, Credits, CrewMember, EpisodeDetails, Genre, MovieDetails,
    Network, SeasonDetails, TvShowDetails,
};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{resource} not found on provider")]
    NotFound { resource: String },

    #[error("Failed to fetch {resource} from provider (HTTP {status})")]
    Fetch { resource: String, status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}

/// Typed access to the external catalog. The resolver only ever needs these
/// three lookups.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Movie details with credits embedded.
    async fn get_movie(&self, id: i64) -> Result<MovieDetails, ProviderError>;

    /// Show details with credits embedded.
    async fn get_tv_show(&self, id: i64)
    -> Result<TvShowDetails, ProviderError>;

    /// Season details including the full episode list.
    async fn get_tv_season(
        &self,
        id: i64,
        season_number: i32,
    ) -> Result<SeasonDetails, ProviderError>;
}
