use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Per-user webhook credentials. Issued and toggled by the settings
/// subsystem; the pipeline only reads them.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub id: Uuid,
    pub user_id: Uuid,
    pub api_key: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .field("enabled", &self.enabled)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}
