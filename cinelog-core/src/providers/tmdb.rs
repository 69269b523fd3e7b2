use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{
    MetadataProvider, MovieDetails, ProviderError, SeasonDetails,
    TvShowDetails,
};

pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub language: String,
    pub timeout: Duration,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: TMDB_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Thin client over the TMDB v3 REST API, authenticated with a static key.
pub struct TmdbClient {
    http: reqwest::Client,
    config: TmdbConfig,
}

impl fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(
                "TMDB API key is empty".to_string(),
            ));
        }
        Url::parse(&config.base_url).map_err(|e| {
            ProviderError::InvalidConfig(format!(
                "invalid TMDB base url '{}': {e}",
                config.base_url
            ))
        })?;

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &TmdbConfig {
        &self.config
    }

    fn endpoint(
        &self,
        path: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<Url, ProviderError> {
        let raw = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let mut url = Url::parse(&raw)
            .map_err(|e| ProviderError::Parse(format!("bad TMDB url {raw}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api_key", &self.config.api_key);
            query.append_pair("language", &self.config.language);
            for (key, value) in extra_params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        resource: String,
        path: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = self.endpoint(path, extra_params)?;
        debug!(%resource, path, "fetching from TMDB");

        // Request URLs carry the API key; keep them out of error messages.
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.without_url()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound { resource });
        }
        if !status.is_success() {
            return Err(ProviderError::Fetch {
                resource,
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| {
            ProviderError::Parse(format!(
                "invalid {resource} payload: {}",
                e.without_url()
            ))
        })
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn get_movie(&self, id: i64) -> Result<MovieDetails, ProviderError> {
        self.fetch(
            format!("movie {id}"),
            &format!("/movie/{id}"),
            &[("append_to_response", "credits")],
        )
        .await
    }

    async fn get_tv_show(
        &self,
        id: i64,
    ) -> Result<TvShowDetails, ProviderError> {
        self.fetch(
            format!("tv show {id}"),
            &format!("/tv/{id}"),
            &[("append_to_response", "credits")],
        )
        .await
    }

    async fn get_tv_season(
        &self,
        id: i64,
        season_number: i32,
    ) -> Result<SeasonDetails, ProviderError> {
        self.fetch(
            format!("tv show {id} season {season_number}"),
            &format!("/tv/{id}/season/{season_number}"),
            &[],
        )
        .await
    }
}
