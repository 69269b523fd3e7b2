use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::payload::{
    EpisodePlaybackEvent, MoviePlaybackEvent, PayloadRejection, SkipReason,
};
use crate::application::unit_of_work::AppUnitOfWork;
use crate::catalog::{CatalogResolver, ResolveError, ResolvedEpisode};
use crate::domain::{Movie, WebhookConfig};
use crate::error::CatalogError;
use crate::providers::{MetadataProvider, ProviderError};
use crate::watch::{RecordedWatch, WatchRecorder};

pub const MISSING_API_KEY: &str = "Missing API key";
pub const INVALID_API_KEY: &str = "Invalid API key";
pub const WEBHOOK_DISABLED: &str = "Webhook is disabled";
pub const INVALID_JSON: &str = "Invalid JSON payload";

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("{0}")]
    Authentication(&'static str),

    #[error("{0}")]
    Authorization(&'static str),

    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Metadata(#[from] ProviderError),

    #[error(transparent)]
    Internal(#[from] CatalogError),
}

impl From<ResolveError> for WebhookError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Provider(e) => WebhookError::Metadata(e),
            ResolveError::Catalog(e) => WebhookError::Internal(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    MovieRecorded {
        movie: Movie,
        recorded: RecordedWatch,
    },
    EpisodeRecorded {
        episode: ResolvedEpisode,
        recorded: RecordedWatch,
    },
    Skipped {
        reason: SkipReason,
    },
}

/// Protocol-free entry point for playback-completion deliveries: auth, parse,
/// threshold, then resolve and record.
#[derive(Clone)]
pub struct WebhookGateway {
    uow: Arc<AppUnitOfWork>,
    resolver: CatalogResolver,
    recorder: WatchRecorder,
}

impl std::fmt::Debug for WebhookGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookGateway")
            .field("uow", &self.uow)
            .field("resolver", &self.resolver)
            .field("recorder", &self.recorder)
            .finish()
    }
}

impl WebhookGateway {
    pub fn new(
        uow: Arc<AppUnitOfWork>,
        provider: Arc<dyn MetadataProvider>,
    ) -> Self {
        Self {
            resolver: CatalogResolver::new(uow.catalog.clone(), provider),
            recorder: WatchRecorder::new(uow.watches.clone()),
            uow,
        }
    }

    pub fn with_dedup_window(mut self, window: Option<Duration>) -> Self {
        self.recorder = self.recorder.with_dedup_window(window);
        self
    }

    pub fn unit_of_work(&self) -> &Arc<AppUnitOfWork> {
        &self.uow
    }

    pub async fn handle_movie_playback_event(
        &self,
        api_key: Option<&str>,
        body: &[u8],
    ) -> Result<WebhookOutcome, WebhookError> {
        let config = self.authenticate(api_key).await?;

        let event = match MoviePlaybackEvent::parse(body)
            .and_then(|event| {
                event.progress.require_complete()?;
                Ok(event)
            }) {
            Ok(event) => event,
            Err(rejection) => return Self::rejected("movie", rejection),
        };

        let movie = self
            .resolver
            .resolve_movie(config.user_id, event.external_id)
            .await?;
        let recorded = self
            .recorder
            .record_movie_watch(config.user_id, movie.id)
            .await?;

        info!(
            user_id = %config.user_id,
            movie_id = %movie.id,
            watch_id = %recorded.watch.id,
            percentage = event.progress.watch_percentage(),
            "Movie watch accepted"
        );
        Ok(WebhookOutcome::MovieRecorded { movie, recorded })
    }

    pub async fn handle_episode_playback_event(
        &self,
        api_key: Option<&str>,
        body: &[u8],
    ) -> Result<WebhookOutcome, WebhookError> {
        let config = self.authenticate(api_key).await?;

        let event = match EpisodePlaybackEvent::parse(body)
            .and_then(|event| {
                event.progress.require_complete()?;
                Ok(event)
            }) {
            Ok(event) => event,
            Err(rejection) => return Self::rejected("episode", rejection),
        };

        let episode = self
            .resolver
            .resolve_episode(
                config.user_id,
                event.show_external_id,
                event.season_number,
                event.episode_number,
            )
            .await?;
        let recorded = self
            .recorder
            .record_episode_watch(
                config.user_id,
                episode.show.id,
                episode.episode.id,
            )
            .await?;

        info!(
            user_id = %config.user_id,
            episode_id = %episode.episode.id,
            watch_id = %recorded.watch.id,
            stub = episode.stub_created,
            "Episode watch accepted"
        );
        Ok(WebhookOutcome::EpisodeRecorded { episode, recorded })
    }

    async fn authenticate(
        &self,
        api_key: Option<&str>,
    ) -> Result<WebhookConfig, WebhookError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(WebhookError::Authentication(MISSING_API_KEY))?;

        let config = self
            .uow
            .webhook_configs
            .find_by_api_key(api_key)
            .await?
            .ok_or(WebhookError::Authentication(INVALID_API_KEY))?;

        if !config.enabled {
            return Err(WebhookError::Authorization(WEBHOOK_DISABLED));
        }
        Ok(config)
    }

    fn rejected(
        kind: &str,
        rejection: PayloadRejection,
    ) -> Result<WebhookOutcome, WebhookError> {
        match rejection {
            PayloadRejection::Malformed(detail) => {
                warn!(kind, %detail, "Rejected webhook body");
                Err(WebhookError::Validation(INVALID_JSON))
            }
            PayloadRejection::Skipped(reason) => {
                warn!(kind, %reason, "Skipped webhook delivery");
                Ok(WebhookOutcome::Skipped { reason })
            }
        }
    }
}
