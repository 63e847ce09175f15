//! Edit transaction: a cancelable working copy of one address.
//!
//! The working copy is always seeded from the persisted row at open time.
//! [`EditTransaction::commit`] writes every field in one `save`; a failed
//! commit leaves the transaction intact so the caller can fix and retry.

use tracing::debug;

use crate::error::Result;
use crate::model::{Address, AddressFields, AddressId, EditField};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTransaction {
    original: Address,
    draft: AddressFields,
}

impl EditTransaction {
    /// Start a fresh session over the latest persisted values of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the address no longer exists.
    pub fn open<S: Store + ?Sized>(store: &S, id: AddressId) -> Result<Self> {
        let original = store.get_address(id)?;
        debug!(%id, "edit opened");
        Ok(Self {
            draft: original.fields(),
            original,
        })
    }

    #[must_use]
    pub const fn address_id(&self) -> AddressId {
        self.original.id
    }

    /// The persisted record the session was opened against.
    #[must_use]
    pub const fn original(&self) -> &Address {
        &self.original
    }

    #[must_use]
    pub const fn draft(&self) -> &AddressFields {
        &self.draft
    }

    pub const fn draft_mut(&mut self) -> &mut AddressFields {
        &mut self.draft
    }

    pub fn set_field(&mut self, field: EditField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    /// True when the working copy differs from the persisted values.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.draft.normalized() != self.original.fields().normalized()
    }

    /// Validate and persist the working copy.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] (nothing written) or
    /// [`crate::Error::NotFound`] if the address vanished.
    pub fn commit<S: Store + ?Sized>(&self, store: &S) -> Result<Address> {
        self.draft.validate()?;
        let saved = store.save(self.original.id, &self.draft)?;
        debug!(id = %saved.id, "edit committed");
        Ok(saved)
    }

    /// Discard the working copy. Nothing is written.
    pub fn cancel(self) -> Address {
        debug!(id = %self.original.id, dirty = self.is_dirty(), "edit cancelled");
        self.original
    }
}
