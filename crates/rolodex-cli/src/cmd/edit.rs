//! `rdx edit`: change fields of one address in a single transaction.

use crate::output::{CliError, OutputMode, fail, render, render_error};
use clap::Args;
use rolodex_core::{Address, AddressId, EditField, EditTransaction, Settings, Store};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Address id (see `rdx list`).
    pub id: AddressId,

    /// New display name (must stay non-empty).
    #[arg(long)]
    pub name: Option<String>,

    /// New nickname; pass an empty string to clear it.
    #[arg(long)]
    pub nickname: Option<String>,

    #[arg(long)]
    pub street: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub zipcode: Option<String>,
}

impl EditArgs {
    /// Field assignments given on the command line, in dialog order.
    fn changes(&self) -> Vec<(EditField, &str)> {
        [
            (EditField::Name, &self.name),
            (EditField::Nickname, &self.nickname),
            (EditField::Street, &self.street),
            (EditField::City, &self.city),
            (EditField::State, &self.state),
            (EditField::Zipcode, &self.zipcode),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

/// Result of `rdx edit`.
#[derive(Debug, Serialize)]
pub struct EditOutcome {
    pub address: Address,
    pub changed: bool,
}

/// Open a transaction on `id`, apply `changes`, and commit when dirty.
///
/// # Errors
///
/// Returns [`rolodex_core::Error::NotFound`] for an unknown id and
/// [`rolodex_core::Error::Validation`] when the result is invalid.
pub fn apply_edit<S: Store>(
    store: &S,
    id: AddressId,
    changes: &[(EditField, &str)],
) -> rolodex_core::Result<EditOutcome> {
    let mut tx = EditTransaction::open(store, id)?;
    for (field, value) in changes {
        tx.set_field(*field, *value);
    }
    if !tx.is_dirty() {
        return Ok(EditOutcome {
            address: tx.cancel(),
            changed: false,
        });
    }
    let address = tx.commit(store)?;
    Ok(EditOutcome {
        address,
        changed: true,
    })
}

/// Execute `rdx edit`.
///
/// # Errors
///
/// Returns an error if no field is given, the address is unknown, or
/// validation fails.
pub fn run_edit(args: &EditArgs, output: OutputMode, settings: &Settings) -> anyhow::Result<()> {
    let changes = args.changes();
    if changes.is_empty() {
        let msg = "nothing to change";
        render_error(
            output,
            &CliError::with_details(
                msg,
                "pass at least one of --name --nickname --street --city --state --zipcode",
                rolodex_core::ErrorCode::ValidationFailed.code(),
            ),
        )?;
        anyhow::bail!("{msg}");
    }

    let store = super::open_store(settings, output)?;
    let outcome = apply_edit(&store, args.id, &changes).map_err(|err| fail(output, err))?;

    render(output, &outcome, |o, w| {
        if o.changed {
            writeln!(w, "Updated {} ({})", o.address.id, o.address.name)
        } else {
            writeln!(w, "No changes for {} ({})", o.address.id, o.address.name)
        }
    })
}
