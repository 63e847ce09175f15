//! rolodex-core library.
//!
//! The address book core: a SQLite-backed entity store, the label
//! association engine, and the session state machine that keeps list
//! selection, the focused detail view, and edit sessions consistent.
//!
//! # Conventions
//!
//! - **Errors**: Core operations return [`error::Result`]; configuration and
//!   filesystem glue use `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod associate;
pub mod bulk;
pub mod config;
pub mod db;
pub mod edit;
pub mod error;
pub mod focus;
pub mod model;
pub mod seed;
pub mod selection;
pub mod session;
pub mod store;

pub use error::{Error, ErrorCode, Result};
pub use model::{Address, AddressFields, AddressId, EditField, Label};
pub use bulk::LabelOutcome;
pub use config::{Collation, Settings};
pub use edit::EditTransaction;
pub use focus::{DetailLine, DetailLineKind, DetailView, FocusState};
pub use selection::Selection;
pub use session::{EntryView, Session};
pub use store::{LabelCount, SqliteStore, Store};
