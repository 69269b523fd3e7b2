use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::database::ports::{
    CatalogRepository, WatchRepository, WebhookConfigRepository,
};
#[cfg(feature = "database")]
use crate::database::{
    infrastructure::postgres::{
        PostgresCatalogRepository, PostgresWatchRepository,
        PostgresWebhookConfigRepository,
    },
    postgres::PostgresDatabase,
};

/// Aggregates the repository ports the webhook pipeline needs.
///
/// Built once per process and shared through the server state.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub catalog: Arc<dyn CatalogRepository>,
    pub watches: Arc<dyn WatchRepository>,
    pub webhook_configs: Arc<dyn WebhookConfigRepository>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("catalog", &type_name_of_val(self.catalog.as_ref()))
            .field("watches", &type_name_of_val(self.watches.as_ref()))
            .field(
                "webhook_configs",
                &type_name_of_val(self.webhook_configs.as_ref()),
            )
            .finish()
    }
}

impl AppUnitOfWork {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        watches: Arc<dyn WatchRepository>,
        webhook_configs: Arc<dyn WebhookConfigRepository>,
    ) -> Self {
        Self {
            catalog,
            watches,
            webhook_configs,
        }
    }
}

#[derive(Default)]
pub struct AppUnitOfWorkBuilder {
    catalog: Option<Arc<dyn CatalogRepository>>,
    watches: Option<Arc<dyn WatchRepository>>,
    webhook_configs: Option<Arc<dyn WebhookConfigRepository>>,
}

impl fmt::Debug for AppUnitOfWorkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWorkBuilder")
            .field("catalog", &self.catalog.is_some())
            .field("watches", &self.watches.is_some())
            .field("webhook_configs", &self.webhook_configs.is_some())
            .finish()
    }
}

impl AppUnitOfWorkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, repo: Arc<dyn CatalogRepository>) -> Self {
        self.catalog = Some(repo);
        self
    }

    pub fn with_watches(mut self, repo: Arc<dyn WatchRepository>) -> Self {
        self.watches = Some(repo);
        self
    }

    pub fn with_webhook_configs(
        mut self,
        repo: Arc<dyn WebhookConfigRepository>,
    ) -> Self {
        self.webhook_configs = Some(repo);
        self
    }

    /// Returns the name of the first missing port.
    pub fn build(self) -> Result<AppUnitOfWork, String> {
        Ok(AppUnitOfWork {
            catalog: self
                .catalog
                .ok_or_else(|| "missing CatalogRepository".to_string())?,
            watches: self
                .watches
                .ok_or_else(|| "missing WatchRepository".to_string())?,
            webhook_configs: self.webhook_configs.ok_or_else(|| {
                "missing WebhookConfigRepository".to_string()
            })?,
        })
    }
}

#[cfg(feature = "database")]
impl AppUnitOfWork {
    /// Compose the Postgres-backed adapters over one shared pool.
    pub fn from_postgres(db: Arc<PostgresDatabase>) -> Result<Self, String> {
        AppUnitOfWorkBuilder::new().with_postgres(db).build()
    }
}

#[cfg(feature = "database")]
impl AppUnitOfWorkBuilder {
    pub fn with_postgres(self, db: Arc<PostgresDatabase>) -> Self {
        let pool = db.pool().clone();
        self.with_catalog(Arc::new(PostgresCatalogRepository::new(pool.clone())))
            .with_watches(Arc::new(PostgresWatchRepository::new(pool.clone())))
            .with_webhook_configs(Arc::new(
                PostgresWebhookConfigRepository::new(pool),
            ))
    }
}
