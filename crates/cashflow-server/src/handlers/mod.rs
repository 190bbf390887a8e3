//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod categories;
pub mod reference;
pub mod statuses;
pub mod subcategories;
pub mod transaction_types;
pub mod transactions;

// Re-export all handlers for use in router
pub use categories::*;
pub use reference::*;
pub use statuses::*;
pub use subcategories::*;
pub use transaction_types::*;
pub use transactions::*;

use axum::extract::Request;
use serde::de::DeserializeOwned;

use crate::{AppError, MAX_BODY_SIZE};

/// Read and deserialize a JSON request body
pub(crate) async fn parse_json_body<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}
