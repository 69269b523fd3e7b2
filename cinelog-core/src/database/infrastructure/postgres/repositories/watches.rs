use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, postgres::PgRow};
use uuid::Uuid;

use super::column;
use crate::database::ports::WatchRepository;
use crate::domain::{NewWatch, Watch, WatchTarget};
use crate::error::{CatalogError, Result};

const WATCH_COLUMNS: &str = "id, user_id, movie_id, tv_show_id, episode_id, \
    watched_at, watch_location, streaming_service, tags, created_at";

#[derive(Clone, Debug)]
pub struct PostgresWatchRepository {
    pool: PgPool,
}

impl PostgresWatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn target_columns(
        target: &WatchTarget,
    ) -> (Option<Uuid>, Option<Uuid>, Option<Uuid>) {
        match *target {
            WatchTarget::Movie { movie_id } => (Some(movie_id), None, None),
            WatchTarget::Episode {
                tv_show_id,
                episode_id,
            } => (None, Some(tv_show_id), Some(episode_id)),
        }
    }

    fn map_row(row: &PgRow) -> Result<Watch> {
        let movie_id: Option<Uuid> = column(row, "movie_id")?;
        let tv_show_id: Option<Uuid> = column(row, "tv_show_id")?;
        let episode_id: Option<Uuid> = column(row, "episode_id")?;
        let target = match (movie_id, tv_show_id, episode_id) {
            (Some(movie_id), None, None) => WatchTarget::Movie { movie_id },
            (None, Some(tv_show_id), Some(episode_id)) => WatchTarget::Episode {
                tv_show_id,
                episode_id,
            },
            _ => {
                return Err(CatalogError::InvalidRecord(
                    "watch row has an inconsistent target".to_string(),
                ));
            }
        };

        Ok(Watch {
            id: column(row, "id")?,
            user_id: column(row, "user_id")?,
            target,
            watched_at: column(row, "watched_at")?,
            watch_location: column(row, "watch_location")?,
            streaming_service: column(row, "streaming_service")?,
            tags: column(row, "tags")?,
            created_at: column(row, "created_at")?,
        })
    }
}

#[async_trait]
impl WatchRepository for PostgresWatchRepository {
    async fn insert_watch(&self, watch: NewWatch) -> Result<Watch> {
        let (movie_id, tv_show_id, episode_id) =
            Self::target_columns(&watch.target);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO watches (
                id, user_id, movie_id, tv_show_id, episode_id, watched_at,
                watch_location, streaming_service, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {WATCH_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(watch.user_id)
        .bind(movie_id)
        .bind(tv_show_id)
        .bind(episode_id)
        .bind(watch.watched_at)
        .bind(watch.watch_location)
        .bind(watch.streaming_service)
        .bind(watch.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CatalogError::Internal(format!("Failed to insert watch: {e}")))?;

        Self::map_row(&row)
    }

    async fn find_recent_watch(
        &self,
        user_id: Uuid,
        target: &WatchTarget,
        since: DateTime<Utc>,
    ) -> Result<Option<Watch>> {
        let target_filter = match target {
            WatchTarget::Movie { .. } => "movie_id = $2",
            WatchTarget::Episode { .. } => "episode_id = $2",
        };

        let row = sqlx::query(&format!(
            "SELECT {WATCH_COLUMNS} FROM watches \
             WHERE user_id = $1 AND {target_filter} AND watched_at >= $3 \
             ORDER BY watched_at DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(target.entity_id())
        .bind(since)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::Internal(format!("Failed to load watch: {e}")))?;

        row.as_ref().map(Self::map_row).transpose()
    }
}
