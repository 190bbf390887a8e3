//! Integrity checks shared by the classification and transaction stores
//!
//! Every helper takes the open write transaction so the check runs under
//! the same lock as the write it guards.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::models::NewTransaction;

/// Maximum length of a classification name
pub(crate) const MAX_NAME_LEN: usize = 100;

/// Trim and validate a required name field
pub(crate) fn clean_name(name: &str, what: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidData(format!("{} name is required", what)));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::InvalidData(format!(
            "{} name must be at most {} characters",
            what, MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// Optional free text is stored as an empty string when absent
pub(crate) fn clean_text(text: Option<&str>) -> String {
    text.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Tables that hold classification rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Table {
    Statuses,
    TransactionTypes,
    Categories,
    Subcategories,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Self::Statuses => "statuses",
            Self::TransactionTypes => "transaction_types",
            Self::Categories => "categories",
            Self::Subcategories => "subcategories",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Statuses => "Status",
            Self::TransactionTypes => "Transaction type",
            Self::Categories => "Category",
            Self::Subcategories => "Subcategory",
        }
    }

    /// Column holding the parent id, for scoped uniqueness
    fn parent_column(self) -> Option<&'static str> {
        match self {
            Self::Statuses | Self::TransactionTypes => None,
            Self::Categories => Some("transaction_type_id"),
            Self::Subcategories => Some("category_id"),
        }
    }
}

/// Error for a missing row
pub(crate) fn not_found(table: Table, id: i64) -> Error {
    Error::NotFound(format!("{} {} not found", table.label(), id))
}

/// Error for a missing transaction
pub(crate) fn not_found_transaction(id: i64) -> Error {
    Error::NotFound(format!("Transaction {} not found", id))
}

/// Fail with `NotFound` unless the row exists
pub(crate) fn ensure_exists(conn: &Connection, table: Table, id: i64) -> Result<()> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?", table.name());
    let exists = conn
        .query_row(&sql, params![id], |_| Ok(()))
        .optional()?
        .is_some();

    if exists {
        Ok(())
    } else {
        Err(not_found(table, id))
    }
}

/// Fail with `DuplicateKey` when another row already uses `name` in the same scope
///
/// `parent` is the scoping parent id for categories and subcategories;
/// `exclude_id` is the row being updated.
pub(crate) fn ensure_unique_name(
    conn: &Connection,
    table: Table,
    name: &str,
    parent: Option<i64>,
    exclude_id: Option<i64>,
) -> Result<()> {
    let existing: Option<i64> = match (table.parent_column(), parent) {
        (Some(column), Some(parent_id)) => {
            let sql = format!(
                "SELECT id FROM {} WHERE name = ? AND {} = ? AND id != ?",
                table.name(),
                column
            );
            conn.query_row(&sql, params![name, parent_id, exclude_id.unwrap_or(0)], |row| {
                row.get(0)
            })
            .optional()?
        }
        _ => {
            let sql = format!("SELECT id FROM {} WHERE name = ? AND id != ?", table.name());
            conn.query_row(&sql, params![name, exclude_id.unwrap_or(0)], |row| row.get(0))
                .optional()?
        }
    };

    match existing {
        Some(_) if parent.is_some() => Err(Error::DuplicateKey(format!(
            "{} '{}' already exists under this parent",
            table.label(),
            name
        ))),
        Some(_) => Err(Error::DuplicateKey(format!(
            "{} '{}' already exists",
            table.label(),
            name
        ))),
        None => Ok(()),
    }
}

/// Map a constraint violation that slipped past the explicit checks
pub(crate) fn map_constraint(err: rusqlite::Error, table: Table, name: &str) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::DuplicateKey(format!("{} '{}' already exists", table.label(), name))
        }
        rusqlite::Error::SqliteFailure(ref e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            Error::ReferentialConflict(format!(
                "{} '{}' is still referenced",
                table.label(),
                name
            ))
        }
        other => Error::Database(other),
    }
}

/// Transaction type a category belongs to
pub(crate) fn category_type(conn: &Connection, category_id: i64) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT transaction_type_id FROM categories WHERE id = ?",
            params![category_id],
            |row| row.get(0),
        )
        .optional()?)
}

/// Category a subcategory belongs to
pub(crate) fn subcategory_category(conn: &Connection, subcategory_id: i64) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT category_id FROM subcategories WHERE id = ?",
            params![subcategory_id],
            |row| row.get(0),
        )
        .optional()?)
}

/// Resolve every reference of a transaction payload and check the
/// type → category → subcategory chain
///
/// Unresolvable ids fail with `NotFound` before any consistency check runs.
pub(crate) fn check_classification_chain(conn: &Connection, tx: &NewTransaction) -> Result<()> {
    ensure_exists(conn, Table::Statuses, tx.status_id)?;
    ensure_exists(conn, Table::TransactionTypes, tx.transaction_type_id)?;

    let category_type_id = category_type(conn, tx.category_id)?
        .ok_or_else(|| not_found(Table::Categories, tx.category_id))?;
    let subcategory_parent = subcategory_category(conn, tx.subcategory_id)?
        .ok_or_else(|| not_found(Table::Subcategories, tx.subcategory_id))?;

    if category_type_id != tx.transaction_type_id {
        return Err(Error::InconsistentClassification(format!(
            "Category {} does not belong to transaction type {}",
            tx.category_id, tx.transaction_type_id
        )));
    }

    if subcategory_parent != tx.category_id {
        return Err(Error::InconsistentClassification(format!(
            "Subcategory {} does not belong to category {}",
            tx.subcategory_id, tx.category_id
        )));
    }

    Ok(())
}

/// Transactions referencing a status
pub(crate) fn transactions_for_status(conn: &Connection, status_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE status_id = ?",
        params![status_id],
        |row| row.get(0),
    )?)
}

/// Transactions referencing a transaction type or anything beneath it
pub(crate) fn transactions_under_type(conn: &Connection, type_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        r#"
        SELECT COUNT(*) FROM transactions
        WHERE transaction_type_id = ?1
           OR category_id IN (SELECT id FROM categories WHERE transaction_type_id = ?1)
           OR subcategory_id IN (
                SELECT sc.id FROM subcategories sc
                JOIN categories c ON sc.category_id = c.id
                WHERE c.transaction_type_id = ?1
           )
        "#,
        params![type_id],
        |row| row.get(0),
    )?)
}

/// Transactions referencing a category or one of its subcategories
pub(crate) fn transactions_under_category(conn: &Connection, category_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        r#"
        SELECT COUNT(*) FROM transactions
        WHERE category_id = ?1
           OR subcategory_id IN (SELECT id FROM subcategories WHERE category_id = ?1)
        "#,
        params![category_id],
        |row| row.get(0),
    )?)
}

/// Transactions referencing a subcategory
pub(crate) fn transactions_for_subcategory(conn: &Connection, subcategory_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE subcategory_id = ?",
        params![subcategory_id],
        |row| row.get(0),
    )?)
}

/// Error for a delete blocked by live transactions
pub(crate) fn referenced(table: Table, id: i64, count: i64) -> Error {
    Error::ReferentialConflict(format!(
        "{} {} is referenced by {} transaction(s)",
        table.label(),
        id,
        count
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Sales ", "Category").unwrap(), "Sales");
        assert!(matches!(
            clean_name("   ", "Category"),
            Err(Error::InvalidData(_))
        ));
        assert!(clean_name(&"x".repeat(MAX_NAME_LEN), "Category").is_ok());
        assert!(clean_name(&"x".repeat(MAX_NAME_LEN + 1), "Category").is_err());
        // Length counts characters, not bytes
        assert!(clean_name(&"ж".repeat(MAX_NAME_LEN), "Category").is_ok());
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(None), "");
        assert_eq!(clean_text(Some(" note ")), "note");
    }
}
