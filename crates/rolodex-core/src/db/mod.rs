//! SQLite address book database.
//!
//! On-disk books run with `journal_mode = WAL`, `synchronous = NORMAL` and
//! a 5s busy timeout. Foreign keys are enforced everywhere.

pub mod migrations;
pub mod query;
pub mod schema;
pub mod write;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{path::Path, time::Duration};

/// Busy timeout used for address book connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the address book at `path`, creating parent
/// directories, then apply pragmas and migrations.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, configured or migrated.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create database directory {}", dir.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("open address book database {}", path.display()))?;
    prepare(conn, true)
}

/// A migrated in-memory address book.
///
/// # Errors
///
/// Returns an error if the schema cannot be applied.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory database")?;
    prepare(conn, false)
}

/// Foreign keys are always on; WAL, `synchronous` and the busy timeout only
/// matter for a file shared between processes.
fn prepare(mut conn: Connection, on_disk: bool) -> Result<Connection> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("enable foreign keys")?;
    if on_disk {
        conn.pragma_update(None, "synchronous", "NORMAL")
            .context("set synchronous")?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .context("enable WAL")?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)
            .context("set busy timeout")?;
    }
    migrations::migrate(&mut conn).context("apply address book migrations")?;
    Ok(conn)
}
