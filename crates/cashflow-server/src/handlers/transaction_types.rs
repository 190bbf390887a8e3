//! Transaction type handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use tracing::info;

use super::parse_json_body;
use crate::{AppError, AppState};
use cashflow_core::models::{
    Category, DeleteOutcome, NewTransactionType, TransactionType, TransactionTypeDetail,
};
use cashflow_core::{ClassificationFilter, ClassificationKind};

/// GET /api/transaction-types - List transaction types (`name`, `search`, `ordering`)
pub async fn list_transaction_types(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<TransactionType>>, AppError> {
    let filter = ClassificationFilter::from_params(ClassificationKind::TransactionType, &params)?;
    Ok(Json(state.db.list_transaction_types(&filter)?))
}

/// GET /api/transaction-types/:id - Get a transaction type with its categories
pub async fn get_transaction_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionTypeDetail>, AppError> {
    let detail = state
        .db
        .get_transaction_type_detail(id)?
        .ok_or_else(|| AppError::not_found("Transaction type not found"))?;

    Ok(Json(detail))
}

/// GET /api/transaction-types/:id/categories - Categories under a transaction type
pub async fn list_categories_of_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.db.get_categories_of_type(id)?))
}

/// POST /api/transaction-types - Create a transaction type
pub async fn create_transaction_type(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<TransactionType>, AppError> {
    let req: NewTransactionType = parse_json_body(request).await?;
    let transaction_type = state.db.create_transaction_type(&req)?;

    info!(
        id = transaction_type.id,
        name = %transaction_type.name,
        "Created transaction type"
    );
    Ok(Json(transaction_type))
}

/// PUT /api/transaction-types/:id - Replace a transaction type
pub async fn update_transaction_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<TransactionType>, AppError> {
    let req: NewTransactionType = parse_json_body(request).await?;
    Ok(Json(state.db.update_transaction_type(id, &req)?))
}

/// DELETE /api/transaction-types/:id - Delete a transaction type and its subtree
pub async fn delete_transaction_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteOutcome>, AppError> {
    Ok(Json(state.db.delete_transaction_type(id)?))
}
