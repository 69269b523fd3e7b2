use std::{fmt, time::Duration};

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tracing::info;

use crate::error::{CatalogError, Result};

/// Owns the connection pool and the schema lifecycle.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("size", &self.pool.size())
            .field("idle", &self.pool.num_idle())
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let connect_options: PgConnectOptions =
            connection_string.parse().map_err(|e| {
                CatalogError::Internal(format!("Invalid database url: {e}"))
            })?;

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                CatalogError::Internal(format!(
                    "Database connection failed: {e}"
                ))
            })?;

        info!(max_connections, "PostgreSQL pool ready");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Verify the server answers before attempting anything else.
    pub async fn preflight_only(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                CatalogError::Internal(format!("Preflight query failed: {e}"))
            })?;
        Ok(())
    }

    pub async fn initialize_schema(&self) -> Result<()> {
        self.preflight_only().await?;

        crate::MIGRATOR.run(&self.pool).await.map_err(|e| {
            CatalogError::Internal(format!("Migration failed: {e}"))
        })?;

        Ok(())
    }
}
