use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::envelope::ApiResponse;
use super::error::ApiResult;
use super::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDetails {
    pub status: String,
    pub version: String,
    pub notes: usize,
    pub uptime_seconds: u64,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<HealthDetails>>> {
    let notes = state.store.lock().await.count()?;
    let details = HealthDetails {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        notes,
        uptime_seconds: state.started_at.elapsed().as_secs(),
    };
    Ok(Json(ApiResponse::with_message("ok", details)))
}
