//! Status operations

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::integrity::{self, Table};
use super::{ClassificationFilter, ClassificationKind, Database};
use crate::error::Result;
use crate::models::*;

fn row_to_status(row: &rusqlite::Row) -> rusqlite::Result<Status> {
    Ok(Status {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

/// Run a status list query on an open connection
pub(super) fn query_statuses(conn: &Connection, filter: &ClassificationFilter) -> Result<Vec<Status>> {
    filter.expect_kind(ClassificationKind::Status)?;

    let built = filter.build();
    let sql = format!(
        "SELECT s.id, s.name, s.description FROM statuses s {} {}",
        built.where_clause, built.order_clause
    );

    let mut stmt = conn.prepare(&sql)?;
    let statuses = stmt
        .query_map(built.params_refs().as_slice(), row_to_status)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(statuses)
}

impl Database {
    /// Create a status; names are unique
    pub fn create_status(&self, new: &NewStatus) -> Result<Status> {
        let name = integrity::clean_name(&new.name, "Status")?;
        let description = integrity::clean_text(new.description.as_deref());

        self.write(|tx| {
            integrity::ensure_unique_name(tx, Table::Statuses, &name, None, None)?;
            tx.execute(
                "INSERT INTO statuses (name, description) VALUES (?, ?)",
                params![name, description],
            )
            .map_err(|e| integrity::map_constraint(e, Table::Statuses, &name))?;

            Ok(Status {
                id: tx.last_insert_rowid(),
                name: name.clone(),
                description: description.clone(),
            })
        })
    }

    /// Get a status by ID
    pub fn get_status(&self, id: i64) -> Result<Option<Status>> {
        let conn = self.conn()?;
        let status = conn
            .query_row(
                "SELECT id, name, description FROM statuses WHERE id = ?",
                params![id],
                row_to_status,
            )
            .optional()?;
        Ok(status)
    }

    /// Replace a status's name and description
    pub fn update_status(&self, id: i64, new: &NewStatus) -> Result<Status> {
        let name = integrity::clean_name(&new.name, "Status")?;
        let description = integrity::clean_text(new.description.as_deref());

        self.write(|tx| {
            integrity::ensure_exists(tx, Table::Statuses, id)?;
            integrity::ensure_unique_name(tx, Table::Statuses, &name, None, Some(id))?;
            tx.execute(
                "UPDATE statuses SET name = ?, description = ? WHERE id = ?",
                params![name, description, id],
            )
            .map_err(|e| integrity::map_constraint(e, Table::Statuses, &name))?;

            Ok(Status {
                id,
                name: name.clone(),
                description: description.clone(),
            })
        })
    }

    /// Delete a status that no transaction references
    pub fn delete_status(&self, id: i64) -> Result<DeleteOutcome> {
        self.write(|tx| {
            integrity::ensure_exists(tx, Table::Statuses, id)?;

            let refs = integrity::transactions_for_status(tx, id)?;
            if refs > 0 {
                return Err(integrity::referenced(Table::Statuses, id, refs));
            }

            tx.execute("DELETE FROM statuses WHERE id = ?", params![id])?;
            info!(status_id = id, "Deleted status");

            Ok(DeleteOutcome {
                deleted_id: id,
                ..Default::default()
            })
        })
    }

    /// List statuses matching a filter
    pub fn list_statuses(&self, filter: &ClassificationFilter) -> Result<Vec<Status>> {
        let conn = self.conn()?;
        query_statuses(&conn, filter)
    }
}
