//! Selection state: the set of marked addresses, independent of focus.
//!
//! Every operation is total. Nothing here touches storage; the set is only
//! consumed by the bulk label command.

use std::collections::BTreeSet;

use crate::model::AddressId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<AddressId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns the new membership.
    pub fn toggle(&mut self, id: AddressId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Replace the whole set.
    pub fn set_all(&mut self, ids: impl IntoIterator<Item = AddressId>) {
        self.ids = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop members for which `keep` returns false.
    pub fn retain(&mut self, keep: impl FnMut(&AddressId) -> bool) {
        self.ids.retain(keep);
    }

    #[must_use]
    pub fn contains(&self, id: AddressId) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Members in ascending identity order.
    pub fn iter(&self) -> impl Iterator<Item = AddressId> + '_ {
        self.ids.iter().copied()
    }
}
