//! Subcategory handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use tracing::info;

use super::parse_json_body;
use crate::{AppError, AppState};
use cashflow_core::models::{DeleteOutcome, NewSubcategory, Subcategory};
use cashflow_core::{ClassificationFilter, ClassificationKind};

/// GET /api/subcategories - List subcategories
/// (`name`, `search`, `transaction_type`, `category`, `ordering`)
pub async fn list_subcategories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Subcategory>>, AppError> {
    let filter = ClassificationFilter::from_params(ClassificationKind::Subcategory, &params)?;
    Ok(Json(state.db.list_subcategories(&filter)?))
}

/// GET /api/subcategories/:id - Get a specific subcategory
pub async fn get_subcategory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Subcategory>, AppError> {
    let subcategory = state
        .db
        .get_subcategory(id)?
        .ok_or_else(|| AppError::not_found("Subcategory not found"))?;

    Ok(Json(subcategory))
}

/// POST /api/subcategories - Create a subcategory under a category
pub async fn create_subcategory(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Subcategory>, AppError> {
    let req: NewSubcategory = parse_json_body(request).await?;
    let subcategory = state.db.create_subcategory(&req)?;

    info!(
        id = subcategory.id,
        name = %subcategory.name,
        category = %subcategory.category_name,
        "Created subcategory"
    );
    Ok(Json(subcategory))
}

/// PUT /api/subcategories/:id - Replace a subcategory
pub async fn update_subcategory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Subcategory>, AppError> {
    let req: NewSubcategory = parse_json_body(request).await?;
    Ok(Json(state.db.update_subcategory(id, &req)?))
}

/// DELETE /api/subcategories/:id - Delete an unreferenced subcategory
pub async fn delete_subcategory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteOutcome>, AppError> {
    Ok(Json(state.db.delete_subcategory(id)?))
}
