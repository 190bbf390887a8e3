//! CashFlow Core Library
//!
//! Shared functionality for the CashFlow bookkeeping service:
//! - Database access and migrations
//! - Classification store (statuses, transaction types, categories, subcategories)
//! - Transaction store with classification-chain validation
//! - Filter engine for transaction and classification listings
//! - Summary aggregation over filtered transactions
//! - Sample data seeding
//! - Configuration file loading

pub mod amount;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::{Config, PaginationSettings, ServerSettings};
pub use db::{
    ClassificationFilter, ClassificationKind, Database, SeedOptions, SeedReport,
    TransactionFilter, TransactionOrdering, TransactionQuery,
};
pub use error::{Error, Result};
