pub mod repositories;

pub use repositories::{
    PostgresCatalogRepository, PostgresWatchRepository,
    PostgresWebhookConfigRepository,
};
