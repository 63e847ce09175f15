//! Canonical SQLite schema for the address book.
//!
//! - `addresses` holds one row per contact; `updated_at` is microseconds
//!   since the Unix epoch
//! - `labels` is keyed by the label name itself
//! - `label_addresses` is the many-to-many join, one row per pair

/// Migration v1: core tables.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS addresses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    street TEXT NOT NULL DEFAULT '',
    city TEXT NOT NULL DEFAULT '',
    state TEXT NOT NULL DEFAULT '',
    zipcode TEXT NOT NULL DEFAULT '',
    nickname TEXT,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS labels (
    name TEXT PRIMARY KEY CHECK (length(trim(name)) > 0)
);

CREATE TABLE IF NOT EXISTS label_addresses (
    label TEXT NOT NULL REFERENCES labels(name) ON DELETE CASCADE ON UPDATE CASCADE,
    address_id INTEGER NOT NULL REFERENCES addresses(id) ON DELETE CASCADE,
    UNIQUE (label, address_id)
);
";

/// Migration v2: read-path indexes for list ordering and label lookup.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_addresses_name
    ON addresses(name, id);

CREATE INDEX IF NOT EXISTS idx_label_addresses_address
    ON label_addresses(address_id, label);
";

/// Indexes expected by list and detail query paths.
pub const REQUIRED_INDEXES: &[&str] = &["idx_addresses_name", "idx_label_addresses_address"];
