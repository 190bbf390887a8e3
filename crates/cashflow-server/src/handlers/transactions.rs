//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use tracing::{debug, info};

use super::parse_json_body;
use crate::{AppError, AppState, SuccessResponse};
use cashflow_core::models::{NewTransaction, Transaction, TransactionPage, TransactionSummary};
use cashflow_core::{TransactionFilter, TransactionQuery};

/// GET /api/transactions - List transactions
///
/// Filter keys: `date_from`, `date_to`, `status`, `transaction_type`,
/// `category`, `subcategory`, `amount_min`, `amount_max`, `search`.
/// Paging and order: `ordering` (`transaction_date`, `amount`, `created`,
/// `-` prefix for descending), `limit`, `offset`.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<TransactionPage>, AppError> {
    let query = TransactionQuery::from_params(&params)?;
    let page = state.db.list_transactions(&query, state.config.pagination)?;

    debug!(
        total = page.total,
        returned = page.transactions.len(),
        "Listed transactions"
    );
    Ok(Json(page))
}

/// GET /api/transactions/summary - Totals and breakdowns for the filtered set
///
/// Accepts the same filter keys as the listing.
pub async fn transaction_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<TransactionSummary>, AppError> {
    let filter = TransactionFilter::from_params(&params)?;
    Ok(Json(state.db.transaction_summary(&filter)?))
}

/// GET /api/transactions/:id - Get a specific transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;

    Ok(Json(transaction))
}

/// POST /api/transactions - Record a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Transaction>, AppError> {
    let req: NewTransaction = parse_json_body(request).await?;
    let transaction = state.db.create_transaction(&req)?;

    info!(
        id = transaction.id,
        amount = %transaction.amount,
        category = %transaction.category_name,
        "Recorded transaction"
    );
    Ok(Json(transaction))
}

/// PUT /api/transactions/:id - Replace a transaction's fields
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Transaction>, AppError> {
    let req: NewTransaction = parse_json_body(request).await?;
    Ok(Json(state.db.update_transaction(id, &req)?))
}

/// DELETE /api/transactions/:id - Delete a transaction
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_transaction(id)?;
    Ok(Json(SuccessResponse { success: true }))
}
