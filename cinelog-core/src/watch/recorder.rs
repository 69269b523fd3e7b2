use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::ports::WatchRepository;
use crate::domain::{
    NewWatch, StreamingService, Watch, WatchLocation, WatchTag, WatchTarget,
};
use crate::error::{CatalogError, Result};

/// Tags stamped on every row this pipeline writes.
pub const WEBHOOK_TAGS: [WatchTag; 2] = [WatchTag::Webhook, WatchTag::Automated];

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWatch {
    pub watch: Watch,
    /// An existing watch inside the dedup window was returned instead of
    /// inserting a new row.
    pub deduplicated: bool,
}

/// Appends watch rows for resolved catalog entities.
///
/// With no dedup window (the default) every call inserts exactly one row.
#[derive(Clone)]
pub struct WatchRecorder {
    watches: Arc<dyn WatchRepository>,
    dedup_window: Option<Duration>,
}

impl std::fmt::Debug for WatchRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchRecorder")
            .field("dedup_window", &self.dedup_window)
            .finish_non_exhaustive()
    }
}

impl WatchRecorder {
    pub fn new(watches: Arc<dyn WatchRepository>) -> Self {
        Self {
            watches,
            dedup_window: None,
        }
    }

    /// A zero window is treated as disabled.
    pub fn with_dedup_window(mut self, window: Option<Duration>) -> Self {
        self.dedup_window = window.filter(|w| !w.is_zero());
        self
    }

    pub fn dedup_window(&self) -> Option<Duration> {
        self.dedup_window
    }

    pub async fn record_movie_watch(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> Result<RecordedWatch> {
        self.record(user_id, WatchTarget::Movie { movie_id }).await
    }

    pub async fn record_episode_watch(
        &self,
        user_id: Uuid,
        tv_show_id: Uuid,
        episode_id: Uuid,
    ) -> Result<RecordedWatch> {
        self.record(
            user_id,
            WatchTarget::Episode {
                tv_show_id,
                episode_id,
            },
        )
        .await
    }

    async fn record(
        &self,
        user_id: Uuid,
        target: WatchTarget,
    ) -> Result<RecordedWatch> {
        let now = Utc::now();

        if let Some(window) = self.dedup_window {
            let window = chrono::Duration::from_std(window).map_err(|e| {
                CatalogError::Internal(format!("dedup window out of range: {e}"))
            })?;
            if let Some(existing) = self
                .watches
                .find_recent_watch(user_id, &target, now - window)
                .await?
            {
                debug!(
                    watch_id = %existing.id,
                    entity_id = %target.entity_id(),
                    "Repeated delivery inside dedup window"
                );
                return Ok(RecordedWatch {
                    watch: existing,
                    deduplicated: true,
                });
            }
        }

        let watch = self
            .watches
            .insert_watch(NewWatch {
                user_id,
                target,
                watched_at: now,
                watch_location: WatchLocation::Home,
                streaming_service: StreamingService::MediaLibrary,
                tags: WEBHOOK_TAGS.to_vec(),
            })
            .await?;

        info!(
            watch_id = %watch.id,
            %user_id,
            entity_id = %target.entity_id(),
            "Recorded watch"
        );
        Ok(RecordedWatch {
            watch,
            deduplicated: false,
        })
    }
}
