use async_trait::async_trait;

use crate::domain::WebhookConfig;
use crate::error::Result;

#[async_trait]
pub trait WebhookConfigRepository: Send + Sync {
    async fn find_by_api_key(&self, api_key: &str)
    -> Result<Option<WebhookConfig>>;
}
