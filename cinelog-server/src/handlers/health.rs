use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::infra::{app_state::AppState, errors::AppResult};

/// Liveness probe. Also round-trips the database when one is configured.
pub async fn health_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Value>> {
    if let Some(db) = &state.postgres {
        sqlx::query("SELECT 1").execute(db.pool()).await?;
    }
    Ok(Json(json!({ "status": "ok" })))
}
