//! Schema manager for outreach.
//!
//! Runs on every open. Creates missing tables, then compares the live
//! `camp_entries` columns against [`ADDITIVE_COLUMNS`] and adds whatever an
//! older database lacks. Existing rows are never touched; columns are never
//! dropped or renamed.

use std::collections::HashSet;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{ADDITIVE_COLUMNS, SCHEMA_STATEMENTS};

/// Initialize the database schema.
///
/// Returns the names of the columns that had to be added, which is empty for
/// a fresh or already current database.
///
/// # Errors
///
/// Returns an error if table creation or a column alteration fails.
pub fn initialize_schema(conn: &Connection) -> Result<Vec<&'static str>> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let existing = table_columns(conn, "camp_entries")?;
    let mut added = Vec::new();

    for (column, declaration) in ADDITIVE_COLUMNS {
        if existing.contains(*column) {
            continue;
        }
        add_column(conn, "camp_entries", column, declaration)?;
        added.push(*column);
    }

    if added.is_empty() {
        debug!("Schema is current");
    } else {
        info!("Migrated camp_entries, added columns: {}", added.join(", "));
    }
    Ok(added)
}

/// Column names of a table, via `PRAGMA table_info`.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<HashSet<_>, _>>()?;
    Ok(columns)
}

/// Add one column with an `ALTER TABLE`.
fn add_column(conn: &Connection, table: &str, column: &str, declaration: &str) -> Result<()> {
    conn.execute(
        &format!("ALTER TABLE {table} ADD COLUMN {column} {declaration}"),
        [],
    )
    .map_err(|e| Error::DatabaseMigration {
        message: format!("adding {table}.{column}: {e}"),
    })?;
    debug!("Added column {}.{}", table, column);
    Ok(())
}
