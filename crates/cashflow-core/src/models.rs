//! Data models for CashFlow

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ========== Classification Models ==========

/// Operational bucket of a transaction (business, personal, tax, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Fields accepted when creating or replacing a status
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStatus {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Cash-flow direction (income vs. expense)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionType {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Fields accepted when creating or replacing a transaction type
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTransactionType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A transaction type together with its categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionTypeDetail {
    #[serde(flatten)]
    pub transaction_type: TransactionType,
    pub categories: Vec<Category>,
}

/// Topic classification scoped under a transaction type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "transaction_type")]
    pub transaction_type_id: i64,
    /// Joined from the parent row at read time
    pub transaction_type_name: String,
    pub description: String,
}

/// Fields accepted when creating or replacing a category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "transaction_type")]
    pub transaction_type_id: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// A category together with its subcategories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
}

/// Second-level classification scoped under a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: i64,
    pub name: String,
    #[serde(rename = "category")]
    pub category_id: i64,
    pub category_name: String,
    /// Transaction type of the parent category
    #[serde(rename = "transaction_type")]
    pub transaction_type_id: i64,
    pub transaction_type_name: String,
    pub description: String,
}

/// Fields accepted when creating or replacing a subcategory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSubcategory {
    pub name: String,
    #[serde(rename = "category")]
    pub category_id: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Result of deleting a classification row
///
/// Deleting a transaction type or category removes its whole subtree; the
/// counts say how many descendants went with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted_id: i64,
    pub categories_removed: i64,
    pub subcategories_removed: i64,
}

/// All classification rows in one payload, for client-side caching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceData {
    pub statuses: Vec<Status>,
    pub transaction_types: Vec<TransactionType>,
    pub categories: Vec<Category>,
    pub subcategories: Vec<Subcategory>,
}

// ========== Transaction Models ==========

/// A recorded cash-flow transaction, with the names of its classification
/// rows joined in for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Assigned once at creation and never changed
    pub created_at: DateTime<Utc>,
    pub transaction_date: NaiveDate,
    #[serde(rename = "status")]
    pub status_id: i64,
    pub status_name: String,
    #[serde(rename = "transaction_type")]
    pub transaction_type_id: i64,
    pub transaction_type_name: String,
    #[serde(rename = "category")]
    pub category_id: i64,
    pub category_name: String,
    #[serde(rename = "subcategory")]
    pub subcategory_id: i64,
    pub subcategory_name: String,
    /// Non-negative magnitude, scale 2
    pub amount: Decimal,
    pub comment: String,
}

/// Raw write payload for a transaction: ids plus scalar fields only
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub transaction_date: NaiveDate,
    #[serde(rename = "status")]
    pub status_id: i64,
    #[serde(rename = "transaction_type")]
    pub transaction_type_id: i64,
    #[serde(rename = "category")]
    pub category_id: i64,
    #[serde(rename = "subcategory")]
    pub subcategory_id: i64,
    pub amount: Decimal,
    #[serde(default)]
    pub comment: Option<String>,
}

/// One page of a filtered transaction listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    /// Number of matches before pagination
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

// ========== Summary Models ==========

/// Count and total for one transaction type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub transaction_type_id: i64,
    pub transaction_type_name: String,
    pub count: i64,
    pub total: Decimal,
}

/// Count and total for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category_id: i64,
    pub category_name: String,
    pub transaction_type_name: String,
    pub count: i64,
    pub total: Decimal,
}

/// Summary statistics over a filtered transaction set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total_count: i64,
    pub total_amount: Decimal,
    /// Zero when nothing matches
    pub average_amount: Decimal,
    pub by_type: Vec<TypeBreakdown>,
    /// Top categories by total, largest first
    pub by_category: Vec<CategoryBreakdown>,
}
