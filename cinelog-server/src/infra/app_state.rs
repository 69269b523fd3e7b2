use std::{fmt, sync::Arc};

use crate::infra::config::Config;
use cinelog_core::application::unit_of_work::AppUnitOfWork;
use cinelog_core::database::PostgresDatabase;
use cinelog_core::webhook::WebhookGateway;

/// Shared by every handler; built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<WebhookGateway>,
    pub unit_of_work: Arc<AppUnitOfWork>,
    pub config: Arc<Config>,
    /// `None` when serving from in-memory repositories.
    pub postgres: Option<Arc<PostgresDatabase>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("postgres", &self.postgres.is_some())
            .finish_non_exhaustive()
    }
}
