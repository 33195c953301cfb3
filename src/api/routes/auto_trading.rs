//! Engine status and settings endpoints

use crate::api::server::AppState;
use crate::services::auto_trader::{RuntimeSnapshot, UpdateSettingsRequest};
use crate::services::control::StatusReport;
use crate::services::metrics::MetricsSnapshot;
use crate::types::Position;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal(e: anyhow::Error) -> ApiError {
    tracing::error!("[Control] Request failed: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct PositionsResponse {
    pub positions: Vec<Position>,
    pub total: usize,
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Result<Json<StatusReport>, ApiError> {
    state.control.status().await.map(Json).map_err(internal)
}

/// GET /api/positions
pub async fn list_positions(
    State(state): State<AppState>,
) -> Result<Json<PositionsResponse>, ApiError> {
    let positions = state.control.positions().await.map_err(internal)?;
    Ok(Json(PositionsResponse {
        total: positions.len(),
        positions,
    }))
}

/// POST /api/settings - partial update, rejected as a whole on bad input
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<RuntimeSnapshot>, ApiError> {
    state.control.apply_update(&request).map(Json).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })
}

/// GET /api/metrics
pub async fn get_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
