//! Subcategory operations

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::integrity::{self, Table};
use super::{ClassificationFilter, ClassificationKind, Database};
use crate::error::{Error, Result};
use crate::models::*;

const SUBCATEGORY_SELECT: &str = r#"
    SELECT sc.id, sc.name, sc.category_id, c.name, c.transaction_type_id, tt.name, sc.description
    FROM subcategories sc
    JOIN categories c ON sc.category_id = c.id
    JOIN transaction_types tt ON c.transaction_type_id = tt.id
"#;

fn row_to_subcategory(row: &rusqlite::Row) -> rusqlite::Result<Subcategory> {
    Ok(Subcategory {
        id: row.get(0)?,
        name: row.get(1)?,
        category_id: row.get(2)?,
        category_name: row.get(3)?,
        transaction_type_id: row.get(4)?,
        transaction_type_name: row.get(5)?,
        description: row.get(6)?,
    })
}

/// Run a subcategory list query on an open connection
pub(super) fn query_subcategories(
    conn: &Connection,
    filter: &ClassificationFilter,
) -> Result<Vec<Subcategory>> {
    filter.expect_kind(ClassificationKind::Subcategory)?;

    let built = filter.build();
    let sql = format!(
        "{} {} {}",
        SUBCATEGORY_SELECT, built.where_clause, built.order_clause
    );

    let mut stmt = conn.prepare(&sql)?;
    let subcategories = stmt
        .query_map(built.params_refs().as_slice(), row_to_subcategory)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(subcategories)
}

fn fetch_subcategory(conn: &Connection, id: i64) -> Result<Option<Subcategory>> {
    let sql = format!("{} WHERE sc.id = ?", SUBCATEGORY_SELECT);
    Ok(conn
        .query_row(&sql, params![id], row_to_subcategory)
        .optional()?)
}

impl Database {
    /// Create a subcategory under an existing category
    pub fn create_subcategory(&self, new: &NewSubcategory) -> Result<Subcategory> {
        let name = integrity::clean_name(&new.name, "Subcategory")?;
        let description = integrity::clean_text(new.description.as_deref());
        let category_id = new.category_id;

        self.write(|tx| {
            integrity::ensure_exists(tx, Table::Categories, category_id)?;
            integrity::ensure_unique_name(
                tx,
                Table::Subcategories,
                &name,
                Some(category_id),
                None,
            )?;
            tx.execute(
                "INSERT INTO subcategories (name, category_id, description) VALUES (?, ?, ?)",
                params![name, category_id, description],
            )
            .map_err(|e| integrity::map_constraint(e, Table::Subcategories, &name))?;

            let id = tx.last_insert_rowid();
            fetch_subcategory(tx, id)?.ok_or_else(|| integrity::not_found(Table::Subcategories, id))
        })
    }

    /// Get a subcategory by ID
    pub fn get_subcategory(&self, id: i64) -> Result<Option<Subcategory>> {
        let conn = self.conn()?;
        fetch_subcategory(&conn, id)
    }

    /// Replace a subcategory's name, category and description
    ///
    /// Moving a subcategory to another category is rejected while
    /// transactions reference it.
    pub fn update_subcategory(&self, id: i64, new: &NewSubcategory) -> Result<Subcategory> {
        let name = integrity::clean_name(&new.name, "Subcategory")?;
        let description = integrity::clean_text(new.description.as_deref());
        let category_id = new.category_id;

        self.write(|tx| {
            let current_category = integrity::subcategory_category(tx, id)?
                .ok_or_else(|| integrity::not_found(Table::Subcategories, id))?;
            integrity::ensure_exists(tx, Table::Categories, category_id)?;

            if current_category != category_id {
                let refs = integrity::transactions_for_subcategory(tx, id)?;
                if refs > 0 {
                    return Err(Error::InconsistentClassification(format!(
                        "Subcategory {} is used by {} transaction(s) and cannot change category",
                        id, refs
                    )));
                }
            }

            integrity::ensure_unique_name(
                tx,
                Table::Subcategories,
                &name,
                Some(category_id),
                Some(id),
            )?;
            tx.execute(
                "UPDATE subcategories SET name = ?, category_id = ?, description = ? WHERE id = ?",
                params![name, category_id, description, id],
            )
            .map_err(|e| integrity::map_constraint(e, Table::Subcategories, &name))?;

            fetch_subcategory(tx, id)?.ok_or_else(|| integrity::not_found(Table::Subcategories, id))
        })
    }

    /// Delete a subcategory that no transaction references
    pub fn delete_subcategory(&self, id: i64) -> Result<DeleteOutcome> {
        self.write(|tx| {
            integrity::ensure_exists(tx, Table::Subcategories, id)?;

            let refs = integrity::transactions_for_subcategory(tx, id)?;
            if refs > 0 {
                return Err(integrity::referenced(Table::Subcategories, id, refs));
            }

            tx.execute("DELETE FROM subcategories WHERE id = ?", params![id])?;
            info!(subcategory_id = id, "Deleted subcategory");

            Ok(DeleteOutcome {
                deleted_id: id,
                ..Default::default()
            })
        })
    }

    /// List subcategories matching a filter
    pub fn list_subcategories(&self, filter: &ClassificationFilter) -> Result<Vec<Subcategory>> {
        let conn = self.conn()?;
        query_subcategories(&conn, filter)
    }
}
