//! Reference data and health handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use cashflow_core::models::ReferenceData;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/reference-data - Every classification row in one payload
pub async fn reference_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReferenceData>, AppError> {
    Ok(Json(state.db.reference_data()?))
}
