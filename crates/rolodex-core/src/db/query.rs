//! `SQLite` query helpers for the address book database.
//!
//! All functions take a shared `&Connection` and return typed structs,
//! never raw rows.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use serde::Serialize;

use crate::config::Collation;
use crate::model::{Address, AddressId, Label};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Label inventory row with usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub name: String,
    pub count: usize,
}

const ADDRESS_COLUMNS: &str =
    "a.id, a.name, a.street, a.city, a.state, a.zipcode, a.nickname, a.updated_at";

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Convert stored microseconds to a UTC timestamp.
pub(crate) fn micros_to_datetime(column: usize, us: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_micros(us).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Integer,
            format!("timestamp out of range: {us}").into(),
        )
    })
}

fn address_from_row(row: &Row<'_>) -> rusqlite::Result<Address> {
    Ok(Address {
        id: AddressId::new(row.get(0)?),
        name: row.get(1)?,
        street: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        zipcode: row.get(5)?,
        nickname: row.get(6)?,
        updated_at: micros_to_datetime(7, row.get(7)?)?,
    })
}

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// All addresses ordered by name under `collation`, ties broken by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_addresses(conn: &Connection, collation: Collation) -> rusqlite::Result<Vec<Address>> {
    let sql = format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses a ORDER BY a.name COLLATE {}, a.id",
        collation.sql_name()
    );
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_map([], address_from_row)?.collect()
}

/// Fetch one address by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_address(conn: &Connection, id: AddressId) -> rusqlite::Result<Option<Address>> {
    conn.query_row(
        &format!("SELECT {ADDRESS_COLUMNS} FROM addresses a WHERE a.id = ?1"),
        [id.get()],
        address_from_row,
    )
    .optional()
}

/// Check whether an address row exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn address_exists(conn: &Connection, id: AddressId) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM addresses WHERE id = ?1)",
        [id.get()],
        |row| row.get(0),
    )
}

/// Number of stored addresses.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_addresses(conn: &Connection) -> rusqlite::Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM addresses", [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Addresses carrying `label`, ordered like [`list_addresses`].
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn addresses_for_label(
    conn: &Connection,
    label: &str,
    collation: Collation,
) -> rusqlite::Result<Vec<Address>> {
    let sql = format!(
        "SELECT {ADDRESS_COLUMNS}
         FROM addresses a
         JOIN label_addresses la ON la.address_id = a.id
         WHERE la.label = ?1
         ORDER BY a.name COLLATE {}, a.id",
        collation.sql_name()
    );
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_map([label], address_from_row)?.collect()
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Labels attached to an address, sorted by name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn labels_for_address(conn: &Connection, id: AddressId) -> rusqlite::Result<Vec<Label>> {
    let mut stmt = conn.prepare(
        "SELECT label FROM label_addresses WHERE address_id = ?1 ORDER BY label COLLATE BINARY",
    )?;
    stmt.query_map([id.get()], |row| row.get::<_, String>(0).map(Label::new))?
        .collect()
}

/// Look up a label by exact name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_label(conn: &Connection, name: &str) -> rusqlite::Result<Option<Label>> {
    conn.query_row("SELECT name FROM labels WHERE name = ?1", [name], |row| {
        row.get::<_, String>(0).map(Label::new)
    })
    .optional()
}

/// Every label with the number of addresses carrying it, sorted by name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_labels(conn: &Connection) -> rusqlite::Result<Vec<LabelCount>> {
    let mut stmt = conn.prepare(
        "SELECT l.name, COUNT(la.address_id)
         FROM labels l
         LEFT JOIN label_addresses la ON la.label = l.name
         GROUP BY l.name
         ORDER BY l.name COLLATE BINARY",
    )?;
    stmt.query_map([], |row| {
        let count: i64 = row.get(1)?;
        Ok(LabelCount {
            name: row.get(0)?,
            count: usize::try_from(count).unwrap_or_default(),
        })
    })?
    .collect()
}

/// Number of association rows for one (label, address) pair: 0 or 1.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn association_count(
    conn: &Connection,
    label: &str,
    id: AddressId,
) -> rusqlite::Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM label_addresses WHERE label = ?1 AND address_id = ?2",
        params![label, id.get()],
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn insert(conn: &Connection, name: &str, street: &str, updated_at: i64) -> AddressId {
        conn.execute(
            "INSERT INTO addresses (name, street, city, state, zipcode, updated_at)
             VALUES (?1, ?2, 'X', 'Y', '1', ?3)",
            params![name, street, updated_at],
        )
        .expect("insert address");
        AddressId::new(conn.last_insert_rowid())
    }

    fn tag(conn: &Connection, label: &str, id: AddressId) {
        conn.execute("INSERT OR IGNORE INTO labels (name) VALUES (?1)", [label])
            .expect("insert label");
        conn.execute(
            "INSERT INTO label_addresses (label, address_id) VALUES (?1, ?2)",
            params![label, id.get()],
        )
        .expect("insert association");
    }

    #[test]
    fn list_orders_by_name_then_id() {
        let conn = open_in_memory().expect("db");
        insert(&conn, "bob", "", 1);
        let zed = insert(&conn, "Zed", "", 1);
        let alice_1 = insert(&conn, "Alice", "", 1);
        let alice_2 = insert(&conn, "Alice", "", 1);

        let names: Vec<_> = list_addresses(&conn, Collation::Binary)
            .expect("list")
            .into_iter()
            .map(|a| (a.name, a.id))
            .collect();
        assert_eq!(names[0], ("Alice".to_string(), alice_1));
        assert_eq!(names[1], ("Alice".to_string(), alice_2));
        assert_eq!(names[2], ("Zed".to_string(), zed));
        assert_eq!(names[3].0, "bob");

        let nocase: Vec<_> = list_addresses(&conn, Collation::Nocase)
            .expect("list")
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(nocase, vec!["Alice", "Alice", "bob", "Zed"]);
    }

    #[test]
    fn get_address_maps_every_column() {
        let conn = open_in_memory().expect("db");
        let id = insert(&conn, "Bob", "1 Main St", 1_700_000_000_000_000);
        conn.execute(
            "UPDATE addresses SET nickname = 'Bobby' WHERE id = ?1",
            [id.get()],
        )
        .expect("set nickname");

        let addr = get_address(&conn, id).expect("query").expect("present");
        assert_eq!(addr.name, "Bob");
        assert_eq!(addr.street, "1 Main St");
        assert_eq!(addr.city, "X");
        assert_eq!(addr.nickname.as_deref(), Some("Bobby"));
        assert_eq!(addr.updated_at.timestamp_micros(), 1_700_000_000_000_000);

        assert!(get_address(&conn, AddressId::new(999)).expect("query").is_none());
        assert!(address_exists(&conn, id).expect("exists"));
        assert!(!address_exists(&conn, AddressId::new(999)).expect("exists"));
    }

    #[test]
    fn labels_for_address_are_sorted() {
        let conn = open_in_memory().expect("db");
        let id = insert(&conn, "Bob", "", 1);
        tag(&conn, "Christmas 2024", id);
        tag(&conn, "Christmas 2019", id);
        tag(&conn, "Birthday", id);

        let labels: Vec<_> = labels_for_address(&conn, id)
            .expect("labels")
            .into_iter()
            .map(|l| l.name().to_string())
            .collect();
        assert_eq!(labels, vec!["Birthday", "Christmas 2019", "Christmas 2024"]);
    }

    #[test]
    fn list_labels_counts_usage_including_unused() {
        let conn = open_in_memory().expect("db");
        let a = insert(&conn, "A", "", 1);
        let b = insert(&conn, "B", "", 1);
        tag(&conn, "Christmas 2024", a);
        tag(&conn, "Christmas 2024", b);
        conn.execute("INSERT INTO labels (name) VALUES ('Christmas 2019')", [])
            .expect("insert label");

        let rows = list_labels(&conn).expect("labels");
        assert_eq!(
            rows,
            vec![
                LabelCount {
                    name: "Christmas 2019".into(),
                    count: 0
                },
                LabelCount {
                    name: "Christmas 2024".into(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn addresses_for_label_filters_and_orders() {
        let conn = open_in_memory().expect("db");
        let carol = insert(&conn, "Carol", "", 1);
        insert(&conn, "Bob", "", 1);
        let alice = insert(&conn, "Alice", "", 1);
        tag(&conn, "Christmas 2024", carol);
        tag(&conn, "Christmas 2024", alice);

        let names: Vec<_> = addresses_for_label(&conn, "Christmas 2024", Collation::Binary)
            .expect("query")
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Alice", "Carol"]);
        assert_eq!(association_count(&conn, "Christmas 2024", alice).expect("count"), 1);
        assert!(get_label(&conn, "Christmas 2024").expect("label").is_some());
        assert!(get_label(&conn, "christmas 2024").expect("label").is_none());
    }
}
