//! `rdx tag` / `rdx untag`: attach or detach one label across many addresses.

use crate::output::{OutputMode, fail, render};
use clap::Args;
use rolodex_core::focus::FocusSync;
use rolodex_core::{AddressId, LabelOutcome, Selection, Settings, Store, associate, bulk};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct TagArgs {
    /// Label name (e.g. "Christmas 2024").
    pub label: String,

    /// Address ids to label.
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<AddressId>,

    /// Create the label first if it does not exist yet.
    #[arg(long)]
    pub create: bool,
}

#[derive(Args, Debug)]
pub struct UntagArgs {
    /// Label name to remove.
    pub label: String,

    /// Address ids to remove it from.
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<AddressId>,
}

/// Result of `rdx untag`.
#[derive(Debug, Serialize)]
pub struct UntagOutcome {
    pub label: String,
    pub removed: usize,
    pub absent: usize,
}

/// Run the bulk label command over exactly `ids`.
///
/// # Errors
///
/// Returns the first core error; attaches made before it are kept.
pub fn tag_ids<S: Store>(
    store: &S,
    label: &str,
    ids: &[AddressId],
    create: bool,
) -> rolodex_core::Result<LabelOutcome> {
    let label = if create {
        store.create_label(label)?
    } else {
        associate::resolve_label(store, label)?
    };
    let mut selection = Selection::new();
    selection.set_all(ids.iter().copied());
    let mut focus = FocusSync::new();
    bulk::apply_label(store, label.name(), &selection, &mut focus, &[])
}

/// Detach `label` from each of `ids`, stopping at the first error.
///
/// # Errors
///
/// Returns [`rolodex_core::Error::LabelNotFound`] or
/// [`rolodex_core::Error::NotFound`].
pub fn untag_ids<S: Store>(
    store: &S,
    label: &str,
    ids: &[AddressId],
) -> rolodex_core::Result<UntagOutcome> {
    let label = associate::resolve_label(store, label)?;
    let mut outcome = UntagOutcome {
        label: label.name().to_string(),
        removed: 0,
        absent: 0,
    };
    for id in ids {
        if associate::detach(store, &label, *id)? {
            outcome.removed += 1;
        } else {
            outcome.absent += 1;
        }
    }
    Ok(outcome)
}

/// Execute `rdx tag`.
///
/// # Errors
///
/// Returns an error if the label or an address is unknown.
pub fn run_tag(args: &TagArgs, output: OutputMode, settings: &Settings) -> anyhow::Result<()> {
    let store = super::open_store(settings, output)?;
    let outcome =
        tag_ids(&store, &args.label, &args.ids, args.create).map_err(|err| fail(output, err))?;

    render(output, &outcome, |o, w| {
        writeln!(
            w,
            "Labeled {} address(es) with '{}' ({} new, {} already)",
            o.total(),
            o.label,
            o.attached,
            o.already
        )
    })
}

/// Execute `rdx untag`.
///
/// # Errors
///
/// Returns an error if the label or an address is unknown.
pub fn run_untag(args: &UntagArgs, output: OutputMode, settings: &Settings) -> anyhow::Result<()> {
    let store = super::open_store(settings, output)?;
    let outcome = untag_ids(&store, &args.label, &args.ids).map_err(|err| fail(output, err))?;

    render(output, &outcome, |o, w| {
        writeln!(
            w,
            "Removed '{}' from {} address(es) ({} did not carry it)",
            o.label, o.removed, o.absent
        )
    })
}
