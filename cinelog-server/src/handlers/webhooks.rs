use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde::Serialize;
use uuid::Uuid;

use crate::infra::{app_state::AppState, errors::AppResult};
use cinelog_core::watch::RecordedWatch;
use cinelog_core::webhook::WebhookOutcome;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieWatchResponse {
    pub success: bool,
    pub movie_id: Uuid,
    pub watch_id: Uuid,
    pub movie_title: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deduplicated: bool,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeWatchResponse {
    pub success: bool,
    pub tv_show_id: Uuid,
    pub season_id: Uuid,
    pub episode_id: Uuid,
    pub watch_id: Uuid,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deduplicated: bool,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkippedResponse {
    pub success: bool,
    pub skipped: bool,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum WebhookResponse {
    Movie(MovieWatchResponse),
    Episode(EpisodeWatchResponse),
    Skipped(SkippedResponse),
}

impl From<WebhookOutcome> for WebhookResponse {
    fn from(outcome: WebhookOutcome) -> Self {
        match outcome {
            WebhookOutcome::MovieRecorded { movie, recorded } => {
                let RecordedWatch {
                    watch,
                    deduplicated,
                } = recorded;
                WebhookResponse::Movie(MovieWatchResponse {
                    success: true,
                    movie_id: movie.id,
                    watch_id: watch.id,
                    movie_title: movie.title,
                    deduplicated,
                })
            }
            WebhookOutcome::EpisodeRecorded { episode, recorded } => {
                WebhookResponse::Episode(EpisodeWatchResponse {
                    success: true,
                    tv_show_id: episode.show.id,
                    season_id: episode.season.id,
                    episode_id: episode.episode.id,
                    watch_id: recorded.watch.id,
                    deduplicated: recorded.deduplicated,
                })
            }
            WebhookOutcome::Skipped { reason } => {
                WebhookResponse::Skipped(SkippedResponse {
                    success: true,
                    skipped: true,
                    message: reason.to_string(),
                })
            }
        }
    }
}

fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Playback-completion webhook for movies.
///
/// Authenticated with the `x-api-key` header. The body is read raw so that
/// malformed JSON maps to `400 {"error":"Invalid JSON payload"}` rather than
/// axum's own rejection.
#[tracing::instrument(skip_all, fields(event = "movie"))]
pub async fn movie_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookResponse>> {
    let outcome = state
        .gateway
        .handle_movie_playback_event(api_key(&headers), &body)
        .await?;
    Ok(Json(outcome.into()))
}

/// Playback-completion webhook for TV episodes. `tmdbId` carries the show id.
#[tracing::instrument(skip_all, fields(event = "episode"))]
pub async fn episode_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookResponse>> {
    let outcome = state
        .gateway
        .handle_episode_playback_event(api_key(&headers), &body)
        .await?;
    Ok(Json(outcome.into()))
}
