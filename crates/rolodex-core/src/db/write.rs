//! `SQLite` write helpers for the address book database.
//!
//! Every function here is a single statement (or one short transaction for
//! [`clear_all`]), so a failed call never leaves a half-written row.

use rusqlite::{Connection, params};

use crate::model::{AddressFields, AddressId};

/// Insert a new address and return its identity.
///
/// # Errors
///
/// Returns an error if the insert fails (for example a blank name).
pub fn insert_address(
    conn: &Connection,
    fields: &AddressFields,
    updated_at_us: i64,
) -> rusqlite::Result<AddressId> {
    conn.execute(
        "INSERT INTO addresses (name, street, city, state, zipcode, nickname, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            fields.name,
            fields.street,
            fields.city,
            fields.state,
            fields.zipcode,
            fields.nickname,
            updated_at_us,
        ],
    )?;
    Ok(AddressId::new(conn.last_insert_rowid()))
}

/// Overwrite every mutable column of one address.
///
/// `updated_at` becomes `max(now_us, previous + 1)` so consecutive saves are
/// strictly ordered even within the same clock tick. Returns the number of
/// rows changed: `0` means the address no longer exists.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_address(
    conn: &Connection,
    id: AddressId,
    fields: &AddressFields,
    now_us: i64,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE addresses
         SET name = ?2, street = ?3, city = ?4, state = ?5, zipcode = ?6,
             nickname = ?7, updated_at = MAX(?8, updated_at + 1)
         WHERE id = ?1",
        params![
            id.get(),
            fields.name,
            fields.street,
            fields.city,
            fields.state,
            fields.zipcode,
            fields.nickname,
            now_us,
        ],
    )
}

/// Create a label unless it already exists. Returns `true` when a row was
/// inserted.
///
/// # Errors
///
/// Returns an error if the insert fails (for example a blank name).
pub fn insert_label(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute("INSERT OR IGNORE INTO labels (name) VALUES (?1)", [name])?;
    Ok(changed > 0)
}

/// Insert the (label, address) pair unless it is already present. Returns
/// `true` when a row was inserted.
///
/// # Errors
///
/// Returns an error if the insert fails, including foreign key violations.
pub fn insert_association(conn: &Connection, label: &str, id: AddressId) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO label_addresses (label, address_id) VALUES (?1, ?2)",
        params![label, id.get()],
    )?;
    Ok(changed > 0)
}

/// Remove the (label, address) pair. Returns `true` when a row was removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_association(conn: &Connection, label: &str, id: AddressId) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "DELETE FROM label_addresses WHERE label = ?1 AND address_id = ?2",
        params![label, id.get()],
    )?;
    Ok(changed > 0)
}

/// Delete an address; its associations cascade. Returns `true` when a row
/// was removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_address(conn: &Connection, id: AddressId) -> rusqlite::Result<bool> {
    let changed = conn.execute("DELETE FROM addresses WHERE id = ?1", [id.get()])?;
    Ok(changed > 0)
}

/// Remove every address, label and association, and restart id numbering.
///
/// # Errors
///
/// Returns an error if any statement fails; nothing is removed in that case.
pub fn clear_all(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "BEGIN IMMEDIATE;
         DELETE FROM label_addresses;
         DELETE FROM labels;
         DELETE FROM addresses;
         DELETE FROM sqlite_sequence WHERE name = 'addresses';
         COMMIT;",
    )
    .inspect_err(|_| {
        let _ = conn.execute_batch("ROLLBACK");
    })
}
