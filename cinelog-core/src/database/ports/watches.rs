use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewWatch, Watch, WatchTarget};
use crate::error::Result;

#[async_trait]
pub trait WatchRepository: Send + Sync {
    /// Append a watch row. Never merges with existing rows.
    async fn insert_watch(&self, watch: NewWatch) -> Result<Watch>;

    /// Most recent watch by `user_id` on the same entity at or after `since`.
    async fn find_recent_watch(
        &self,
        user_id: Uuid,
        target: &WatchTarget,
        since: DateTime<Utc>,
    ) -> Result<Option<Watch>>;
}
