//! Status handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use tracing::info;

use super::parse_json_body;
use crate::{AppError, AppState};
use cashflow_core::models::{DeleteOutcome, NewStatus, Status};
use cashflow_core::{ClassificationFilter, ClassificationKind};

/// GET /api/statuses - List statuses (`name`, `search`, `ordering`)
pub async fn list_statuses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Status>>, AppError> {
    let filter = ClassificationFilter::from_params(ClassificationKind::Status, &params)?;
    Ok(Json(state.db.list_statuses(&filter)?))
}

/// GET /api/statuses/:id - Get a specific status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Status>, AppError> {
    let status = state
        .db
        .get_status(id)?
        .ok_or_else(|| AppError::not_found("Status not found"))?;

    Ok(Json(status))
}

/// POST /api/statuses - Create a status
pub async fn create_status(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Status>, AppError> {
    let req: NewStatus = parse_json_body(request).await?;
    let status = state.db.create_status(&req)?;

    info!(id = status.id, name = %status.name, "Created status");
    Ok(Json(status))
}

/// PUT /api/statuses/:id - Replace a status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Status>, AppError> {
    let req: NewStatus = parse_json_body(request).await?;
    Ok(Json(state.db.update_status(id, &req)?))
}

/// DELETE /api/statuses/:id - Delete an unreferenced status
pub async fn delete_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteOutcome>, AppError> {
    let outcome = state.db.delete_status(id)?;

    info!(id, "Deleted status");
    Ok(Json(outcome))
}
