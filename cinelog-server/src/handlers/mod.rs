//! HTTP request handlers

pub mod health;
pub mod webhooks;

pub use health::health_handler;
pub use webhooks::{episode_webhook_handler, movie_webhook_handler};
