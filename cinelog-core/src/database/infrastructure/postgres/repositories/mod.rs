pub mod catalog;
pub mod watches;
pub mod webhook_configs;

pub use catalog::PostgresCatalogRepository;
pub use watches::PostgresWatchRepository;
pub use webhook_configs::PostgresWebhookConfigRepository;

use sqlx::{Decode, Postgres, Row, Type, postgres::PgRow};

use crate::error::{CatalogError, Result};

pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get(name).map_err(|e| {
        CatalogError::Internal(format!("Failed to read column {name}: {e}"))
    })
}
