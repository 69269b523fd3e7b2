//! Playback-completion webhooks from the home media server.

pub mod gateway;
pub mod payload;

pub use gateway::{WebhookError, WebhookGateway, WebhookOutcome};
pub use payload::{
    COMPLETION_THRESHOLD, EpisodePlaybackEvent, MoviePlaybackEvent,
    PayloadRejection, PlaybackProgress, SkipReason,
};
