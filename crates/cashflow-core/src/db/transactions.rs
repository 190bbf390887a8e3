//! Transaction operations

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::integrity;
use super::transaction_filter::TRANSACTION_FROM;
use super::{Database, TransactionQuery};
use crate::amount;
use crate::config::PaginationSettings;
use crate::error::{Error, Result};
use crate::models::*;

/// Column list matching `row_to_transaction`
const TRANSACTION_COLUMNS: &str = r#"
    t.id, t.created_at, t.transaction_date,
    t.status_id, s.name, t.transaction_type_id, tt.name,
    t.category_id, c.name, t.subcategory_id, sc.name,
    t.amount_cents, t.comment
"#;

fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
    let cents: i64 = row.get(11)?;
    Ok(Transaction {
        id: row.get(0)?,
        created_at: row.get(1)?,
        transaction_date: row.get(2)?,
        status_id: row.get(3)?,
        status_name: row.get(4)?,
        transaction_type_id: row.get(5)?,
        transaction_type_name: row.get(6)?,
        category_id: row.get(7)?,
        category_name: row.get(8)?,
        subcategory_id: row.get(9)?,
        subcategory_name: row.get(10)?,
        amount: amount::from_minor_units(cents),
        comment: row.get(12)?,
    })
}

fn fetch_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let sql = format!(
        "SELECT {} {} WHERE t.id = ?",
        TRANSACTION_COLUMNS, TRANSACTION_FROM
    );
    Ok(conn
        .query_row(&sql, params![id], row_to_transaction)
        .optional()?)
}

impl Database {
    /// Record a transaction after checking its classification chain
    pub fn create_transaction(&self, new: &NewTransaction) -> Result<Transaction> {
        let cents = amount::to_minor_units(new.amount)?;
        let comment = integrity::clean_text(new.comment.as_deref());

        self.write(|tx| {
            integrity::check_classification_chain(tx, new)?;

            tx.execute(
                r#"
                INSERT INTO transactions
                    (created_at, transaction_date, status_id, transaction_type_id,
                     category_id, subcategory_id, amount_cents, comment)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    Utc::now(),
                    new.transaction_date,
                    new.status_id,
                    new.transaction_type_id,
                    new.category_id,
                    new.subcategory_id,
                    cents,
                    comment,
                ],
            )?;

            let id = tx.last_insert_rowid();
            debug!(transaction_id = id, "Created transaction");
            fetch_transaction(tx, id)?.ok_or_else(|| integrity::not_found_transaction(id))
        })
    }

    /// Get a transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        fetch_transaction(&conn, id)
    }

    /// Replace every writable field of a transaction
    ///
    /// `created_at` is left untouched.
    pub fn update_transaction(&self, id: i64, new: &NewTransaction) -> Result<Transaction> {
        let cents = amount::to_minor_units(new.amount)?;
        let comment = integrity::clean_text(new.comment.as_deref());

        self.write(|tx| {
            let exists = tx
                .query_row(
                    "SELECT 1 FROM transactions WHERE id = ?",
                    params![id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Err(integrity::not_found_transaction(id));
            }

            integrity::check_classification_chain(tx, new)?;

            tx.execute(
                r#"
                UPDATE transactions
                SET transaction_date = ?, status_id = ?, transaction_type_id = ?,
                    category_id = ?, subcategory_id = ?, amount_cents = ?, comment = ?
                WHERE id = ?
                "#,
                params![
                    new.transaction_date,
                    new.status_id,
                    new.transaction_type_id,
                    new.category_id,
                    new.subcategory_id,
                    cents,
                    comment,
                    id,
                ],
            )?;

            fetch_transaction(tx, id)?.ok_or_else(|| integrity::not_found_transaction(id))
        })
    }

    /// Delete a transaction
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        self.write(|tx| {
            let deleted = tx.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
            if deleted == 0 {
                return Err(integrity::not_found_transaction(id));
            }
            info!(transaction_id = id, "Deleted transaction");
            Ok(())
        })
    }

    /// List transactions matching a query, one page at a time
    ///
    /// The page size falls back to `pagination.default_limit` and is capped at
    /// `pagination.max_limit`. `total` counts every match before pagination.
    pub fn list_transactions(
        &self,
        query: &TransactionQuery,
        pagination: PaginationSettings,
    ) -> Result<TransactionPage> {
        if matches!(query.limit, Some(limit) if limit <= 0) {
            return Err(Error::InvalidFilter("'limit' must be positive".into()));
        }
        if query.offset < 0 {
            return Err(Error::InvalidFilter("'offset' must not be negative".into()));
        }
        let limit = pagination.resolve_limit(query.limit);
        let offset = query.offset;
        let built = query.filter.build(query.ordering)?;

        self.read(|tx| {
            let total: i64 = tx.query_row(
                &built.build_count_query(),
                built.params_refs().as_slice(),
                |row| row.get(0),
            )?;

            let sql = format!(
                "SELECT {} {} {} {} LIMIT ? OFFSET ?",
                TRANSACTION_COLUMNS, TRANSACTION_FROM, built.where_clause, built.order_clause
            );
            let mut params = built.params_refs();
            params.push(&limit);
            params.push(&offset);

            let mut stmt = tx.prepare(&sql)?;
            let transactions = stmt
                .query_map(params.as_slice(), row_to_transaction)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(TransactionPage {
                transactions,
                total,
                limit,
                offset,
            })
        })
    }

    /// Number of stored transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}
