//! Category operations
//!
//! A category's name is unique within its transaction type. Deleting a
//! category removes its subcategories unless a transaction references any
//! of them.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::integrity::{self, Table};
use super::subcategories::query_subcategories;
use super::{ClassificationFilter, ClassificationKind, Database};
use crate::error::{Error, Result};
use crate::models::*;

const CATEGORY_SELECT: &str = r#"
    SELECT c.id, c.name, c.transaction_type_id, tt.name, c.description
    FROM categories c
    JOIN transaction_types tt ON c.transaction_type_id = tt.id
"#;

fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        transaction_type_id: row.get(2)?,
        transaction_type_name: row.get(3)?,
        description: row.get(4)?,
    })
}

/// Run a category list query on an open connection
pub(super) fn query_categories(
    conn: &Connection,
    filter: &ClassificationFilter,
) -> Result<Vec<Category>> {
    filter.expect_kind(ClassificationKind::Category)?;

    let built = filter.build();
    let sql = format!(
        "{} {} {}",
        CATEGORY_SELECT, built.where_clause, built.order_clause
    );

    let mut stmt = conn.prepare(&sql)?;
    let categories = stmt
        .query_map(built.params_refs().as_slice(), row_to_category)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(categories)
}

fn fetch_category(conn: &Connection, id: i64) -> Result<Option<Category>> {
    let sql = format!("{} WHERE c.id = ?", CATEGORY_SELECT);
    Ok(conn.query_row(&sql, params![id], row_to_category).optional()?)
}

impl Database {
    /// Create a category under an existing transaction type
    pub fn create_category(&self, new: &NewCategory) -> Result<Category> {
        let name = integrity::clean_name(&new.name, "Category")?;
        let description = integrity::clean_text(new.description.as_deref());
        let type_id = new.transaction_type_id;

        self.write(|tx| {
            integrity::ensure_exists(tx, Table::TransactionTypes, type_id)?;
            integrity::ensure_unique_name(tx, Table::Categories, &name, Some(type_id), None)?;
            tx.execute(
                "INSERT INTO categories (name, transaction_type_id, description) VALUES (?, ?, ?)",
                params![name, type_id, description],
            )
            .map_err(|e| integrity::map_constraint(e, Table::Categories, &name))?;

            let id = tx.last_insert_rowid();
            fetch_category(tx, id)?.ok_or_else(|| integrity::not_found(Table::Categories, id))
        })
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        fetch_category(&conn, id)
    }

    /// Get a category together with its subcategories
    pub fn get_category_detail(&self, id: i64) -> Result<Option<CategoryDetail>> {
        self.read(|tx| match fetch_category(tx, id)? {
            Some(category) => {
                let filter =
                    ClassificationFilter::new(ClassificationKind::Subcategory).category(Some(id));
                let subcategories = query_subcategories(tx, &filter)?;
                Ok(Some(CategoryDetail {
                    category,
                    subcategories,
                }))
            }
            None => Ok(None),
        })
    }

    /// Subcategories belonging to a category
    pub fn get_subcategories_of_category(&self, category_id: i64) -> Result<Vec<Subcategory>> {
        self.read(|tx| {
            integrity::ensure_exists(tx, Table::Categories, category_id)?;
            let filter = ClassificationFilter::new(ClassificationKind::Subcategory)
                .category(Some(category_id));
            query_subcategories(tx, &filter)
        })
    }

    /// Replace a category's name, transaction type and description
    ///
    /// Moving a category to another transaction type is rejected while
    /// transactions reference it, since their type would no longer match.
    pub fn update_category(&self, id: i64, new: &NewCategory) -> Result<Category> {
        let name = integrity::clean_name(&new.name, "Category")?;
        let description = integrity::clean_text(new.description.as_deref());
        let type_id = new.transaction_type_id;

        self.write(|tx| {
            let current_type = integrity::category_type(tx, id)?
                .ok_or_else(|| integrity::not_found(Table::Categories, id))?;
            integrity::ensure_exists(tx, Table::TransactionTypes, type_id)?;

            if current_type != type_id {
                let refs = integrity::transactions_under_category(tx, id)?;
                if refs > 0 {
                    return Err(Error::InconsistentClassification(format!(
                        "Category {} is used by {} transaction(s) and cannot change transaction type",
                        id, refs
                    )));
                }
            }

            integrity::ensure_unique_name(tx, Table::Categories, &name, Some(type_id), Some(id))?;
            tx.execute(
                "UPDATE categories SET name = ?, transaction_type_id = ?, description = ? WHERE id = ?",
                params![name, type_id, description, id],
            )
            .map_err(|e| integrity::map_constraint(e, Table::Categories, &name))?;

            fetch_category(tx, id)?.ok_or_else(|| integrity::not_found(Table::Categories, id))
        })
    }

    /// Delete a category and its subcategories
    pub fn delete_category(&self, id: i64) -> Result<DeleteOutcome> {
        self.write(|tx| {
            integrity::ensure_exists(tx, Table::Categories, id)?;

            let refs = integrity::transactions_under_category(tx, id)?;
            if refs > 0 {
                return Err(integrity::referenced(Table::Categories, id, refs));
            }

            let subcategories_removed =
                tx.execute("DELETE FROM subcategories WHERE category_id = ?", params![id])?;
            tx.execute("DELETE FROM categories WHERE id = ?", params![id])?;

            info!(category_id = id, subcategories_removed, "Deleted category");

            Ok(DeleteOutcome {
                deleted_id: id,
                categories_removed: 0,
                subcategories_removed: subcategories_removed as i64,
            })
        })
    }

    /// List categories matching a filter
    pub fn list_categories(&self, filter: &ClassificationFilter) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        query_categories(&conn, filter)
    }
}
