//! SQLite schema migrations for the address book database.

use super::schema;
use rusqlite::{Connection, types::Type};

/// Latest schema version understood by this binary.
pub const LATEST_SCHEMA_VERSION: u32 = 2;

const MIGRATIONS: &[(u32, &str)] = &[(1, schema::MIGRATION_V1_SQL), (2, schema::MIGRATION_V2_SQL)];

/// Schema version recorded in `PRAGMA user_version`.
///
/// # Errors
///
/// Returns an error if the pragma cannot be read or holds a negative or
/// oversized value.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let raw: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(err)))
}

/// Bring the address book schema up to [`LATEST_SCHEMA_VERSION`].
///
/// Versions at or below `user_version` are skipped. Each step runs in its
/// own transaction and bumps `user_version` before committing.
///
/// # Errors
///
/// Returns an error if any step fails; earlier steps stay applied.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
    let start = current_schema_version(conn)?;
    let mut reached = start;

    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > start) {
        let step = conn.transaction()?;
        step.execute_batch(sql)?;
        step.pragma_update(None, "user_version", i64::from(version))?;
        step.commit()?;
        tracing::debug!(from = reached, to = version, "address book schema upgraded");
        reached = version;
    }

    Ok(reached)
}
