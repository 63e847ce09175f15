//! Label association engine.
//!
//! Attach and detach are idempotent: attaching an existing pair returns the
//! existing association, and detaching a missing pair is a no-op. Attach is
//! a single insert whose rejection names the missing endpoint; detach checks
//! both endpoints first, since deleting an absent row cannot tell them apart.

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{AddressId, Association, Label};
use crate::store::Store;

/// Outcome of [`attach`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub association: Association,
    /// `false` when the pair already existed.
    pub created: bool,
}

/// Resolve a label by name, ignoring surrounding whitespace.
///
/// # Errors
///
/// Returns [`Error::LabelNotFound`] if no label has that exact name.
pub fn resolve_label<S: Store + ?Sized>(store: &S, name: &str) -> Result<Label> {
    store
        .find_label(name.trim())?
        .ok_or_else(|| Error::LabelNotFound {
            name: name.to_string(),
        })
}

fn check_endpoints<S: Store + ?Sized>(store: &S, label: &Label, id: AddressId) -> Result<()> {
    store.get_address(id)?;
    resolve_label(store, label.name())?;
    Ok(())
}

/// Attach `label` to an address, creating the association only if absent.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown address and
/// [`Error::LabelNotFound`] for an unknown label.
pub fn attach<S: Store + ?Sized>(store: &S, label: &Label, id: AddressId) -> Result<Attachment> {
    let created = store.insert_association(label, id)?;
    debug!(%label, %id, created, "attached label");
    Ok(Attachment {
        association: Association {
            label: label.clone(),
            address_id: id,
        },
        created,
    })
}

/// Remove `label` from an address. Returns `false` if it was not attached.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown address and
/// [`Error::LabelNotFound`] for an unknown label.
pub fn detach<S: Store + ?Sized>(store: &S, label: &Label, id: AddressId) -> Result<bool> {
    check_endpoints(store, label, id)?;
    let removed = store.delete_association(label, id)?;
    debug!(%label, %id, removed, "detached label");
    Ok(removed)
}

/// Labels attached to an address, sorted by name.
///
/// # Errors
///
/// Returns [`Error::Storage`] if the read fails.
pub fn labels_for<S: Store + ?Sized>(store: &S, id: AddressId) -> Result<Vec<Label>> {
    store.labels_for(id)
}
