use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgRow};

use super::column;
use crate::database::ports::WebhookConfigRepository;
use crate::domain::WebhookConfig;
use crate::error::{CatalogError, Result};

#[derive(Clone, Debug)]
pub struct PostgresWebhookConfigRepository {
    pool: PgPool,
}

impl PostgresWebhookConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<WebhookConfig> {
        Ok(WebhookConfig {
            id: column(row, "id")?,
            user_id: column(row, "user_id")?,
            api_key: column(row, "api_key")?,
            enabled: column(row, "enabled")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl WebhookConfigRepository for PostgresWebhookConfigRepository {
    async fn find_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<WebhookConfig>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, api_key, enabled, created_at, updated_at
            FROM webhook_configs
            WHERE api_key = $1
            "#,
        )
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            CatalogError::Internal(format!("Failed to load webhook config: {e}"))
        })?;

        row.as_ref().map(Self::map_row).transpose()
    }
}
