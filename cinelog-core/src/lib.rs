//! # Cinelog Core
//!
//! Core library for the Cinelog tracking service: turns playback-completion
//! webhooks from a home media server into catalog entries and watch records.
//!
//! ## Overview
//!
//! - **Webhook gateway**: authenticates deliveries, parses lenient payloads
//!   and applies the completion threshold ([`webhook`])
//! - **Catalog resolution**: maps TMDB ids to local movies and
//!   show/season/episode rows, creating them on demand ([`catalog`])
//! - **Watch recording**: appends provenance-tagged watch rows ([`watch`])
//! - **Metadata providers**: typed TMDB client ([`providers`])
//! - **Persistence**: repository ports with Postgres and in-memory adapters
//!   ([`database`])
//!
//! ## Feature Flags
//!
//! - `database` (default): PostgreSQL adapters and [`MIGRATOR`]
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cinelog_core::{
//!     database::InMemoryBackend,
//!     providers::{TmdbClient, TmdbConfig},
//!     webhook::{WebhookGateway, WebhookOutcome},
//! };
//!
//! async fn deliver() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryBackend::new();
//!     backend
//!         .webhook_configs
//!         .insert(uuid::Uuid::new_v4(), "secret", true)
//!         .await;
//!
//!     let tmdb = TmdbClient::new(TmdbConfig::new("tmdb-key"))?;
//!     let gateway =
//!         WebhookGateway::new(Arc::new(backend.unit_of_work()), Arc::new(tmdb));
//!
//!     let body = br#"{"tmdbId":"603","totalRunTimeInTicks":"100","currentRunTimeInTicks":"80"}"#;
//!     if let WebhookOutcome::MovieRecorded { movie, .. } = gateway
//!         .handle_movie_playback_event(Some("secret"), body)
//!         .await?
//!     {
//!         println!("Recorded {}", movie.title);
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Repository aggregation shared by the server and tests
pub mod application;

/// Catalog resolution against the metadata provider
pub mod catalog;

/// Persistence ports and adapters
pub mod database;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Domain records
pub mod domain;

/// Error types and error handling utilities
pub mod error;

/// External metadata providers (TMDB integration)
pub mod providers;

/// Watch recording
pub mod watch;

/// Webhook gateway and payload parsing
pub mod webhook;

pub use error::{CatalogError, Result};
