//! Transaction type operations
//!
//! Deleting a type removes its categories and their subcategories, provided
//! no transaction references anything in that subtree.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::categories::query_categories;
use super::integrity::{self, Table};
use super::{ClassificationFilter, ClassificationKind, Database};
use crate::error::Result;
use crate::models::*;

fn row_to_transaction_type(row: &rusqlite::Row) -> rusqlite::Result<TransactionType> {
    Ok(TransactionType {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

/// Run a transaction type list query on an open connection
pub(super) fn query_transaction_types(
    conn: &Connection,
    filter: &ClassificationFilter,
) -> Result<Vec<TransactionType>> {
    filter.expect_kind(ClassificationKind::TransactionType)?;

    let built = filter.build();
    let sql = format!(
        "SELECT tt.id, tt.name, tt.description FROM transaction_types tt {} {}",
        built.where_clause, built.order_clause
    );

    let mut stmt = conn.prepare(&sql)?;
    let types = stmt
        .query_map(built.params_refs().as_slice(), row_to_transaction_type)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(types)
}

impl Database {
    /// Create a transaction type; names are unique
    pub fn create_transaction_type(&self, new: &NewTransactionType) -> Result<TransactionType> {
        let name = integrity::clean_name(&new.name, "Transaction type")?;
        let description = integrity::clean_text(new.description.as_deref());

        self.write(|tx| {
            integrity::ensure_unique_name(tx, Table::TransactionTypes, &name, None, None)?;
            tx.execute(
                "INSERT INTO transaction_types (name, description) VALUES (?, ?)",
                params![name, description],
            )
            .map_err(|e| integrity::map_constraint(e, Table::TransactionTypes, &name))?;

            Ok(TransactionType {
                id: tx.last_insert_rowid(),
                name: name.clone(),
                description: description.clone(),
            })
        })
    }

    /// Get a transaction type by ID
    pub fn get_transaction_type(&self, id: i64) -> Result<Option<TransactionType>> {
        let conn = self.conn()?;
        let tt = conn
            .query_row(
                "SELECT id, name, description FROM transaction_types WHERE id = ?",
                params![id],
                row_to_transaction_type,
            )
            .optional()?;
        Ok(tt)
    }

    /// Get a transaction type together with its categories
    pub fn get_transaction_type_detail(&self, id: i64) -> Result<Option<TransactionTypeDetail>> {
        self.read(|tx| {
            let transaction_type = tx
                .query_row(
                    "SELECT id, name, description FROM transaction_types WHERE id = ?",
                    params![id],
                    row_to_transaction_type,
                )
                .optional()?;

            match transaction_type {
                Some(transaction_type) => {
                    let filter = ClassificationFilter::new(ClassificationKind::Category)
                        .transaction_type(Some(id));
                    let categories = query_categories(tx, &filter)?;
                    Ok(Some(TransactionTypeDetail {
                        transaction_type,
                        categories,
                    }))
                }
                None => Ok(None),
            }
        })
    }

    /// Categories belonging to a transaction type
    pub fn get_categories_of_type(&self, type_id: i64) -> Result<Vec<Category>> {
        self.read(|tx| {
            integrity::ensure_exists(tx, Table::TransactionTypes, type_id)?;
            let filter = ClassificationFilter::new(ClassificationKind::Category)
                .transaction_type(Some(type_id));
            query_categories(tx, &filter)
        })
    }

    /// Replace a transaction type's name and description
    pub fn update_transaction_type(
        &self,
        id: i64,
        new: &NewTransactionType,
    ) -> Result<TransactionType> {
        let name = integrity::clean_name(&new.name, "Transaction type")?;
        let description = integrity::clean_text(new.description.as_deref());

        self.write(|tx| {
            integrity::ensure_exists(tx, Table::TransactionTypes, id)?;
            integrity::ensure_unique_name(tx, Table::TransactionTypes, &name, None, Some(id))?;
            tx.execute(
                "UPDATE transaction_types SET name = ?, description = ? WHERE id = ?",
                params![name, description, id],
            )
            .map_err(|e| integrity::map_constraint(e, Table::TransactionTypes, &name))?;

            Ok(TransactionType {
                id,
                name: name.clone(),
                description: description.clone(),
            })
        })
    }

    /// Delete a transaction type and its whole subtree
    ///
    /// Rejected with `ReferentialConflict` if any transaction references the
    /// type, one of its categories, or one of their subcategories.
    pub fn delete_transaction_type(&self, id: i64) -> Result<DeleteOutcome> {
        self.write(|tx| {
            integrity::ensure_exists(tx, Table::TransactionTypes, id)?;

            let refs = integrity::transactions_under_type(tx, id)?;
            if refs > 0 {
                return Err(integrity::referenced(Table::TransactionTypes, id, refs));
            }

            let subcategories_removed = tx.execute(
                r#"
                DELETE FROM subcategories
                WHERE category_id IN (SELECT id FROM categories WHERE transaction_type_id = ?)
                "#,
                params![id],
            )?;
            let categories_removed = tx.execute(
                "DELETE FROM categories WHERE transaction_type_id = ?",
                params![id],
            )?;
            tx.execute("DELETE FROM transaction_types WHERE id = ?", params![id])?;

            info!(
                transaction_type_id = id,
                categories_removed, subcategories_removed, "Deleted transaction type"
            );

            Ok(DeleteOutcome {
                deleted_id: id,
                categories_removed: categories_removed as i64,
                subcategories_removed: subcategories_removed as i64,
            })
        })
    }

    /// List transaction types matching a filter
    pub fn list_transaction_types(
        &self,
        filter: &ClassificationFilter,
    ) -> Result<Vec<TransactionType>> {
        let conn = self.conn()?;
        query_transaction_types(&conn, filter)
    }
}
