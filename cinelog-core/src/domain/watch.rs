use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a watch row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WatchTarget {
    Movie { movie_id: Uuid },
    Episode { tv_show_id: Uuid, episode_id: Uuid },
}

impl WatchTarget {
    /// Id of the watched entity (the movie or the episode).
    pub fn entity_id(&self) -> Uuid {
        match self {
            WatchTarget::Movie { movie_id } => *movie_id,
            WatchTarget::Episode { episode_id, .. } => *episode_id,
        }
    }
}

/// Where the watch happened, mirroring the `watch_location` database enum
#[cfg_attr(feature = "database", derive(sqlx::Type))]
#[cfg_attr(
    feature = "database",
    sqlx(type_name = "watch_location", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchLocation {
    Home,
    Cinema,
    Elsewhere,
}

impl WatchLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchLocation::Home => "HOME",
            WatchLocation::Cinema => "CINEMA",
            WatchLocation::Elsewhere => "ELSEWHERE",
        }
    }
}

impl fmt::Display for WatchLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "database", derive(sqlx::Type))]
#[cfg_attr(
    feature = "database",
    sqlx(type_name = "streaming_service", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamingService {
    /// Played from the user's own home media library server.
    MediaLibrary,
    Other,
}

impl StreamingService {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamingService::MediaLibrary => "MEDIA_LIBRARY",
            StreamingService::Other => "OTHER",
        }
    }
}

impl fmt::Display for StreamingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance tags attached to a watch row.
#[cfg_attr(feature = "database", derive(sqlx::Type))]
#[cfg_attr(
    feature = "database",
    sqlx(type_name = "watch_tag", rename_all = "lowercase")
)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WatchTag {
    Webhook,
    Automated,
    Manual,
}

impl WatchTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchTag::Webhook => "webhook",
            WatchTag::Automated => "automated",
            WatchTag::Manual => "manual",
        }
    }
}

// `Vec<WatchTag>` binds to `watch_tag[]` via the `PgHasArrayType` impl
// generated by `derive(sqlx::Type)` (array type `_watch_tag`).

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watch {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target: WatchTarget,
    pub watched_at: DateTime<Utc>,
    pub watch_location: WatchLocation,
    pub streaming_service: StreamingService,
    pub tags: Vec<WatchTag>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWatch {
    pub user_id: Uuid,
    pub target: WatchTarget,
    pub watched_at: DateTime<Utc>,
    pub watch_location: WatchLocation,
    pub streaming_service: StreamingService,
    pub tags: Vec<WatchTag>,
}

impl NewWatch {
    pub fn into_watch(self, id: Uuid, created_at: DateTime<Utc>) -> Watch {
        Watch {
            id,
            user_id: self.user_id,
            target: self.target,
            watched_at: self.watched_at,
            watch_location: self.watch_location,
            streaming_service: self.streaming_service,
            tags: self.tags,
            created_at,
        }
    }
}
