pub mod catalog;
pub mod watches;
pub mod webhook_configs;

pub use catalog::{CatalogRepository, LoadedSeason};
pub use watches::WatchRepository;
pub use webhook_configs::WebhookConfigRepository;
