//! Category handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use tracing::info;

use super::parse_json_body;
use crate::{AppError, AppState};
use cashflow_core::models::{Category, CategoryDetail, DeleteOutcome, NewCategory, Subcategory};
use cashflow_core::{ClassificationFilter, ClassificationKind};

/// GET /api/categories - List categories
/// (`name`, `search`, `transaction_type`, `ordering`)
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Category>>, AppError> {
    let filter = ClassificationFilter::from_params(ClassificationKind::Category, &params)?;
    Ok(Json(state.db.list_categories(&filter)?))
}

/// GET /api/categories/:id - Get a category with its subcategories
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryDetail>, AppError> {
    let detail = state
        .db
        .get_category_detail(id)?
        .ok_or_else(|| AppError::not_found("Category not found"))?;

    Ok(Json(detail))
}

/// GET /api/categories/:id/subcategories - Subcategories under a category
pub async fn list_subcategories_of_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Subcategory>>, AppError> {
    Ok(Json(state.db.get_subcategories_of_category(id)?))
}

/// POST /api/categories - Create a category under a transaction type
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let req: NewCategory = parse_json_body(request).await?;
    let category = state.db.create_category(&req)?;

    info!(
        id = category.id,
        name = %category.name,
        transaction_type = %category.transaction_type_name,
        "Created category"
    );
    Ok(Json(category))
}

/// PUT /api/categories/:id - Replace a category
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let req: NewCategory = parse_json_body(request).await?;
    Ok(Json(state.db.update_category(id, &req)?))
}

/// DELETE /api/categories/:id - Delete a category and its subcategories
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteOutcome>, AppError> {
    Ok(Json(state.db.delete_category(id)?))
}
