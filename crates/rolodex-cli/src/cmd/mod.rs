pub mod completions;
pub mod edit;
pub mod labels;
pub mod list;
pub mod seed;
pub mod show;
pub mod tag;

use anyhow::Context;
use rolodex_core::{Settings, SqliteStore};

use crate::output::{CliError, OutputMode, render_error};

/// Open the configured address book, rendering a failure before returning it.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub fn open_store(settings: &Settings, output: OutputMode) -> anyhow::Result<SqliteStore> {
    let path = settings.database_path();
    match SqliteStore::open(&path, settings.list.collation)
        .with_context(|| format!("open address book at {}", path.display()))
    {
        Ok(store) => Ok(store),
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    format!("{err:#}"),
                    "check --db / ROLODEX_DATABASE__PATH and file permissions",
                    rolodex_core::ErrorCode::StorageFailure.code(),
                ),
            )?;
            Err(err)
        }
    }
}
