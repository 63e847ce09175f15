//! Entity store: typed access to addresses, labels and their associations.
//!
//! [`Store`] is the seam between the session core and persistence. The
//! production implementation is [`SqliteStore`]; tests wrap it to observe
//! or inject calls.

use std::path::Path;

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::Collation;
use crate::db::{self, query, write};
use crate::error::{Error, Result};
use crate::model::{Address, AddressFields, AddressId, Label};

pub use crate::db::query::LabelCount;

/// Repository interface used by the association engine, edit transactions
/// and the session.
pub trait Store {
    /// All addresses sorted by name ascending, ties broken by identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the read fails.
    fn list_addresses(&self) -> Result<Vec<Address>>;

    /// Load one address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such address exists.
    fn get_address(&self, id: AddressId) -> Result<Address>;

    /// Labels attached to an address, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the read fails.
    fn labels_for(&self, id: AddressId) -> Result<Vec<Label>>;

    /// Resolve a label by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the read fails.
    fn find_label(&self, name: &str) -> Result<Option<Label>>;

    /// Persist every mutable field and refresh `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name (nothing is written) and
    /// [`Error::NotFound`] if the address no longer exists.
    fn save(&self, id: AddressId, fields: &AddressFields) -> Result<Address>;

    /// Insert a new address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name.
    fn create_address(&self, fields: &AddressFields) -> Result<Address>;

    /// Get-or-create a label by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name.
    fn create_label(&self, name: &str) -> Result<Label>;

    /// Insert an association row if absent. Returns `true` when created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown address,
    /// [`Error::LabelNotFound`] for an unknown label, and [`Error::Storage`]
    /// if the write fails otherwise.
    fn insert_association(&self, label: &Label, id: AddressId) -> Result<bool>;

    /// Remove an association row if present. Returns `true` when removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the write fails.
    fn delete_association(&self, label: &Label, id: AddressId) -> Result<bool>;

    /// Label inventory with usage counts, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the read fails.
    fn list_labels_with_counts(&self) -> Result<Vec<LabelCount>>;

    /// Addresses carrying a label, in list order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LabelNotFound`] if the label is unknown.
    fn addresses_for_label(&self, name: &str) -> Result<Vec<Address>>;

    /// Delete an address and its associations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such address exists.
    fn delete_address(&self, id: AddressId) -> Result<()>;

    /// Remove every row from every table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the reset fails.
    fn reset(&self) -> Result<()>;

    /// Name ordering applied by [`Store::list_addresses`].
    fn collation(&self) -> Collation {
        Collation::Binary
    }
}

/// [`Store`] backed by a single `SQLite` connection.
pub struct SqliteStore {
    conn: Connection,
    collation: Collation,
}

impl SqliteStore {
    /// Open (creating and migrating as needed) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path, collation: Collation) -> anyhow::Result<Self> {
        let conn = db::open_database(path)?;
        debug!(path = %path.display(), ?collation, "opened address book store");
        Ok(Self { conn, collation })
    }

    /// A fresh, migrated in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self {
            conn: db::open_in_memory()?,
            collation: Collation::default(),
        })
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }

    /// Raw connection, for diagnostics and tests.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Which side of a rejected association row is missing.
    fn missing_endpoint(&self, label: &Label, id: AddressId) -> Error {
        match self.find_label(label.name()) {
            Ok(Some(_)) => Error::address_not_found(id),
            Ok(None) => Error::LabelNotFound {
                name: label.name().to_string(),
            },
            Err(err) => err,
        }
    }

    /// Number of stored addresses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the read fails.
    pub fn count_addresses(&self) -> Result<usize> {
        Ok(query::count_addresses(&self.conn)?)
    }
}

fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

/// Trimmed label name, or a validation error when nothing is left.
fn label_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            field: "label",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(name)
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

impl Store for SqliteStore {
    fn list_addresses(&self) -> Result<Vec<Address>> {
        Ok(query::list_addresses(&self.conn, self.collation)?)
    }

    fn get_address(&self, id: AddressId) -> Result<Address> {
        query::get_address(&self.conn, id)?.ok_or_else(|| Error::address_not_found(id))
    }

    fn labels_for(&self, id: AddressId) -> Result<Vec<Label>> {
        Ok(query::labels_for_address(&self.conn, id)?)
    }

    fn find_label(&self, name: &str) -> Result<Option<Label>> {
        Ok(query::get_label(&self.conn, name)?)
    }

    fn save(&self, id: AddressId, fields: &AddressFields) -> Result<Address> {
        fields.validate()?;
        let fields = fields.normalized();
        if write::update_address(&self.conn, id, &fields, now_micros())? == 0 {
            return Err(Error::address_not_found(id));
        }
        let saved = self.get_address(id)?;
        info!(%id, name = %saved.name, updated_at = %saved.updated_at, "saved address");
        Ok(saved)
    }

    fn create_address(&self, fields: &AddressFields) -> Result<Address> {
        fields.validate()?;
        let id = write::insert_address(&self.conn, &fields.normalized(), now_micros())?;
        debug!(%id, name = %fields.name, "created address");
        self.get_address(id)
    }

    fn create_label(&self, name: &str) -> Result<Label> {
        let name = label_name(name)?;
        if write::insert_label(&self.conn, name)? {
            debug!(label = name, "created label");
        }
        Ok(Label::new(name))
    }

    fn insert_association(&self, label: &Label, id: AddressId) -> Result<bool> {
        match write::insert_association(&self.conn, label.name(), id) {
            Ok(created) => Ok(created),
            Err(err) if is_foreign_key_violation(&err) => Err(self.missing_endpoint(label, id)),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_association(&self, label: &Label, id: AddressId) -> Result<bool> {
        Ok(write::delete_association(&self.conn, label.name(), id)?)
    }

    fn list_labels_with_counts(&self) -> Result<Vec<LabelCount>> {
        Ok(query::list_labels(&self.conn)?)
    }

    fn addresses_for_label(&self, name: &str) -> Result<Vec<Address>> {
        if self.find_label(name)?.is_none() {
            return Err(Error::LabelNotFound {
                name: name.to_string(),
            });
        }
        Ok(query::addresses_for_label(&self.conn, name, self.collation)?)
    }

    fn delete_address(&self, id: AddressId) -> Result<()> {
        if write::delete_address(&self.conn, id)? {
            info!(%id, "deleted address");
            Ok(())
        } else {
            Err(Error::address_not_found(id))
        }
    }

    fn reset(&self) -> Result<()> {
        write::clear_all(&self.conn)?;
        info!("cleared address book");
        Ok(())
    }

    fn collation(&self) -> Collation {
        self.collation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::in_memory().expect("store")
    }

    #[test]
    fn list_is_name_ordered_with_configured_collation() {
        let store = store();
        for name in ["carol", "Bob", "alice"] {
            store
                .create_address(&AddressFields::named(name))
                .expect("create");
        }

        let binary: Vec<_> = store
            .list_addresses()
            .expect("list")
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(binary, vec!["Bob", "alice", "carol"]);

        let store = store.with_collation(Collation::Nocase);
        let nocase: Vec<_> = store
            .list_addresses()
            .expect("list")
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(nocase, vec!["alice", "Bob", "carol"]);
    }

    #[test]
    fn save_persists_all_fields_and_advances_timestamp() {
        let store = store();
        let alice = store
            .create_address(&AddressFields::named("Alice"))
            .expect("create");

        let fields = AddressFields::new("Alice", "42 Elm", "Town", "ST", "00000").with_nickname("Al");
        let saved = store.save(alice.id, &fields).expect("save");

        assert_eq!(saved.fields(), fields);
        assert!(saved.is_complete());
        assert!(saved.updated_at > alice.updated_at);
        assert_eq!(store.get_address(alice.id).expect("get"), saved);
    }

    #[test]
    fn save_rejects_blank_name_without_writing() {
        let store = store();
        let alice = store
            .create_address(&AddressFields::named("Alice"))
            .expect("create");

        let err = store
            .save(alice.id, &AddressFields::named(""))
            .expect_err("blank name");
        assert!(matches!(err, Error::Validation { field: "name", .. }));
        assert_eq!(store.get_address(alice.id).expect("get"), alice);
    }

    #[test]
    fn save_of_deleted_address_is_not_found() {
        let store = store();
        let alice = store
            .create_address(&AddressFields::named("Alice"))
            .expect("create");
        store.delete_address(alice.id).expect("delete");

        let err = store
            .save(alice.id, &AddressFields::named("Alice"))
            .expect_err("missing row");
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(matches!(
            store.delete_address(alice.id),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn create_label_is_get_or_create() {
        let store = store();
        let first = store.create_label("Christmas 2024").expect("label");
        let second = store.create_label("Christmas 2024").expect("label");
        let padded = store.create_label("  Christmas 2024 ").expect("label");
        assert_eq!(first, second);
        assert_eq!(padded, first);
        assert_eq!(padded.name(), "Christmas 2024");
        assert_eq!(store.list_labels_with_counts().expect("labels").len(), 1);
        assert!(matches!(
            store.create_label("  "),
            Err(Error::Validation { field: "label", .. })
        ));
    }

    #[test]
    fn rejected_association_names_the_missing_side() {
        let store = store();
        let bob = store
            .create_address(&AddressFields::named("Bob"))
            .expect("create");
        let label = store.create_label("Christmas 2024").expect("label");

        assert!(matches!(
            store.insert_association(&label, AddressId::new(bob.id.get() + 1)),
            Err(Error::NotFound { entity: "address", .. })
        ));
        assert!(matches!(
            store.insert_association(&Label::new("Easter"), bob.id),
            Err(Error::LabelNotFound { name }) if name == "Easter"
        ));
        assert!(store.insert_association(&label, bob.id).expect("attach"));
    }

    #[test]
    fn addresses_for_unknown_label_is_an_error() {
        let store = store();
        let err = store
            .addresses_for_label("Christmas 1999")
            .expect_err("unknown label");
        assert!(matches!(err, Error::LabelNotFound { name } if name == "Christmas 1999"));
    }

    #[test]
    fn reset_clears_everything() {
        let store = store();
        let bob = store
            .create_address(&AddressFields::named("Bob"))
            .expect("create");
        let label = store.create_label("Christmas 2024").expect("label");
        store.insert_association(&label, bob.id).expect("attach");

        store.reset().expect("reset");
        assert_eq!(store.count_addresses().expect("count"), 0);
        assert!(store.find_label("Christmas 2024").expect("find").is_none());
    }
}
