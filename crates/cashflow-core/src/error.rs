//! Error types for CashFlow

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A uniqueness invariant (name, or name within parent) would be violated
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The entity is still referenced by a transaction, directly or through a descendant
    #[error("Referential conflict: {0}")]
    ReferentialConflict(String),

    /// A transaction's type/category/subcategory chain does not line up
    #[error("Inconsistent classification: {0}")]
    InconsistentClassification(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Unknown filter key or a value that does not parse
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Stable snake_case name of the error kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) | Self::Pool(_) => "database",
            Self::Encryption(_) => "encryption",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Config(_) => "config",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::ReferentialConflict(_) => "referential_conflict",
            Self::InconsistentClassification(_) => "inconsistent_classification",
            Self::NotFound(_) => "not_found",
            Self::InvalidFilter(_) => "invalid_filter",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
