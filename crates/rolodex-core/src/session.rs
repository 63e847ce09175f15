//! The running address book session.
//!
//! [`Session`] owns the listed addresses, the selection, focus/detail sync
//! and at most one open edit. The rendering layer holds a `Session`, feeds
//! it events, and reads entries and the detail view back out; the session
//! never calls into the renderer.

use tracing::{debug, warn};

use crate::bulk::{self, LabelOutcome};
use crate::edit::EditTransaction;
use crate::error::{Error, Result};
use crate::focus::{DetailView, FocusState, FocusSync};
use crate::model::{Address, AddressFields, AddressId, EditField};
use crate::selection::Selection;
use crate::store::Store;

/// Per-entry render hints for the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryView<'a> {
    pub address: &'a Address,
    pub selected: bool,
    pub incomplete: bool,
    pub focused: bool,
}

pub struct Session<S: Store> {
    store: S,
    addresses: Vec<Address>,
    selection: Selection,
    focus: FocusSync,
    edit: Option<EditTransaction>,
}

impl<S: Store> Session<S> {
    /// Load the list and focus the first address in name order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the initial load fails.
    pub fn open(store: S) -> Result<Self> {
        let mut session = Self {
            store,
            addresses: Vec::new(),
            selection: Selection::new(),
            focus: FocusSync::new(),
            edit: None,
        };
        session.reload()?;
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub const fn focus_state(&self) -> FocusState {
        self.focus.state()
    }

    #[must_use]
    pub fn focused(&self) -> Option<&Address> {
        let id = self.focus.focused()?;
        self.addresses.iter().find(|a| a.id == id)
    }

    /// Index of the focused entry in [`Session::addresses`].
    #[must_use]
    pub fn focused_index(&self) -> Option<usize> {
        let id = self.focus.focused()?;
        self.position_of(id)
    }

    #[must_use]
    pub fn position_of(&self, id: AddressId) -> Option<usize> {
        self.addresses.iter().position(|a| a.id == id)
    }

    #[must_use]
    pub const fn detail(&self) -> Option<&DetailView> {
        self.focus.detail()
    }

    #[must_use]
    pub const fn edit(&self) -> Option<&EditTransaction> {
        self.edit.as_ref()
    }

    /// Entries in list order with their render hints.
    pub fn entries(&self) -> impl Iterator<Item = EntryView<'_>> + '_ {
        let focused = self.focus.focused();
        self.addresses.iter().map(move |address| EntryView {
            address,
            selected: self.selection.contains(address.id),
            incomplete: !address.is_complete(),
            focused: focused == Some(address.id),
        })
    }

    // -----------------------------------------------------------------------
    // Navigation and selection
    // -----------------------------------------------------------------------

    /// Move focus to a listed address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` is not in the list; focus is
    /// unchanged in that case.
    pub fn navigate(&mut self, id: AddressId) -> Result<()> {
        if self.focus.focused() == Some(id) {
            return Ok(());
        }
        let address = self
            .addresses
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::address_not_found(id))?;
        self.focus.move_focus(&self.store, address)
    }

    /// Flip selection of the focused address. Returns the new membership.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFocus`] when the list is empty.
    pub fn toggle_focused(&mut self) -> Result<bool> {
        let id = self.focus.focused().ok_or(Error::NoFocus)?;
        Ok(self.toggle(id))
    }

    /// Flip selection of `id`. Ids that are not listed are ignored and
    /// report `false`.
    pub fn toggle(&mut self, id: AddressId) -> bool {
        if self.position_of(id).is_none() {
            return false;
        }
        let selected = self.selection.toggle(id);
        debug!(%id, selected, "selection toggled");
        selected
    }

    pub fn select_all(&mut self) {
        self.selection.set_all(self.addresses.iter().map(|a| a.id));
        debug!(count = self.selection.len(), "selected all");
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
        debug!("selection cleared");
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Open a fresh edit over the focused address, replacing any edit that
    /// is already open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFocus`] on an empty list and [`Error::NotFound`] if
    /// the focused row vanished from storage.
    pub fn open_edit(&mut self) -> Result<&EditTransaction> {
        let id = self.focus.focused().ok_or(Error::NoFocus)?;
        let tx = EditTransaction::open(&self.store, id)?;
        Ok(self.edit.insert(tx))
    }

    /// Working copy of the open edit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EditNotOpen`] when no edit is open.
    pub fn edit_mut(&mut self) -> Result<&mut AddressFields> {
        self.edit
            .as_mut()
            .map(EditTransaction::draft_mut)
            .ok_or(Error::EditNotOpen)
    }

    /// Set one field of the working copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EditNotOpen`] when no edit is open.
    pub fn set_edit_field(&mut self, field: EditField, value: impl Into<String>) -> Result<()> {
        self.edit_mut()?.set(field, value);
        Ok(())
    }

    /// Persist the open edit, update the list entry and recompute the
    /// detail view if the edited address is focused.
    ///
    /// Once the save succeeds the commit is reported as `Ok`. If the label
    /// read for the detail view then fails, the view is rebuilt from the
    /// labels it already showed, since an edit never changes associations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EditNotOpen`] when nothing is open. Validation and
    /// storage errors from the save leave the edit open and in-memory state
    /// unchanged.
    pub fn commit_edit(&mut self) -> Result<Address> {
        let tx = self.edit.as_ref().ok_or(Error::EditNotOpen)?;
        let saved = tx.commit(&self.store).inspect_err(|err| {
            warn!(id = %tx.address_id(), error = %err, "edit commit rejected");
        })?;
        self.edit = None;

        if let Some(slot) = self.addresses.iter_mut().find(|a| a.id == saved.id) {
            slot.clone_from(&saved);
        } else {
            self.addresses.push(saved.clone());
        }
        self.sort_addresses();
        if let Err(err) = self.focus.refresh(&self.store, &saved) {
            warn!(id = %saved.id, error = %err, "label read failed after save, reusing shown labels");
            let labels = self.focus.known_labels().to_vec();
            self.focus.rebuild(&saved, labels);
        }
        Ok(saved)
    }

    /// Discard the open edit. Returns whether one was open.
    pub fn cancel_edit(&mut self) -> bool {
        self.edit.take().map(EditTransaction::cancel).is_some()
    }

    // -----------------------------------------------------------------------
    // Labels and reload
    // -----------------------------------------------------------------------

    /// Run the bulk label command over the current selection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LabelNotFound`] before any write for an unknown
    /// label, or the first attach failure.
    pub fn apply_label(&mut self, label: &str) -> Result<LabelOutcome> {
        bulk::apply_label(
            &self.store,
            label,
            &self.selection,
            &mut self.focus,
            &self.addresses,
        )
    }

    /// Re-read the list from storage, evict stale selection members, and
    /// keep focus on the same address when it is still listed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the list cannot be read; the session
    /// is unchanged in that case.
    pub fn reload(&mut self) -> Result<()> {
        let addresses = self.store.list_addresses()?;
        let previous = self.focus.focused();
        let target = previous
            .and_then(|id| addresses.iter().find(|a| a.id == id))
            .or_else(|| addresses.first());

        match target {
            Some(address) => self.focus.move_focus(&self.store, address)?,
            None => self.focus.clear(),
        }

        self.addresses = addresses;
        let listed: Vec<AddressId> = self.addresses.iter().map(|a| a.id).collect();
        self.selection.retain(|id| listed.contains(id));
        debug!(
            count = self.addresses.len(),
            selected = self.selection.len(),
            "address list reloaded"
        );
        Ok(())
    }

    fn sort_addresses(&mut self) {
        let collation = self.store.collation();
        self.addresses.sort_by(|a, b| {
            collation
                .compare(&a.name, &b.name)
                .then_with(|| a.id.cmp(&b.id))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn session(names: &[&str]) -> Session<SqliteStore> {
        let store = SqliteStore::in_memory().expect("store");
        for name in names {
            store
                .create_address(&AddressFields::named(*name))
                .expect("create");
        }
        Session::open(store).expect("session")
    }

    fn names(session: &Session<SqliteStore>) -> Vec<&str> {
        session.addresses().iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn empty_list_is_unfocused() {
        let mut s = session(&[]);
        assert_eq!(s.focus_state(), FocusState::Unfocused);
        assert!(s.detail().is_none());
        assert!(matches!(s.toggle_focused(), Err(Error::NoFocus)));
        assert!(matches!(s.open_edit(), Err(Error::NoFocus)));
    }

    #[test]
    fn initial_focus_is_first_by_name() {
        let s = session(&["Carol", "Alice", "Bob"]);
        assert_eq!(s.focused().map(|a| a.name.as_str()), Some("Alice"));
        assert_eq!(s.focused_index(), Some(0));
    }

    #[test]
    fn navigate_to_unlisted_id_is_rejected() {
        let mut s = session(&["Alice"]);
        let before = s.focus_state();
        assert!(matches!(
            s.navigate(AddressId::new(999)),
            Err(Error::NotFound { .. })
        ));
        assert_eq!(s.focus_state(), before);
    }

    #[test]
    fn entries_carry_render_hints() {
        let mut s = session(&["Alice", "Bob"]);
        let bob = s.addresses()[1].id;
        s.toggle(bob);

        let hints: Vec<_> = s
            .entries()
            .map(|e| (e.address.name.as_str(), e.selected, e.incomplete, e.focused))
            .collect();
        assert_eq!(
            hints,
            vec![("Alice", false, true, true), ("Bob", true, true, false)]
        );
    }

    #[test]
    fn select_all_then_none() {
        let mut s = session(&["Alice", "Bob"]);
        s.select_all();
        assert_eq!(s.selection().len(), 2);
        s.select_none();
        assert!(s.selection().is_empty());
        assert!(!s.toggle(AddressId::new(999)));
        assert!(s.selection().is_empty());
    }

    #[test]
    fn commit_resorts_and_keeps_focus_on_edited_entry() {
        let mut s = session(&["Alice", "Bob"]);
        let alice = s.addresses()[0].id;

        s.open_edit().expect("open");
        s.set_edit_field(EditField::Name, "Zoe").expect("set");
        s.commit_edit().expect("commit");

        assert_eq!(names(&s), vec!["Bob", "Zoe"]);
        assert_eq!(s.focused().map(|a| a.id), Some(alice));
        assert_eq!(s.focused_index(), Some(1));
        assert!(s.edit().is_none());
    }

    #[test]
    fn rejected_commit_keeps_edit_open() {
        let mut s = session(&["Alice"]);
        s.open_edit().expect("open");
        s.edit_mut().expect("draft").name.clear();

        assert!(matches!(s.commit_edit(), Err(Error::Validation { .. })));
        assert!(s.edit().is_some());
        assert_eq!(names(&s), vec!["Alice"]);
    }

    #[test]
    fn edit_calls_without_open_edit_fail() {
        let mut s = session(&["Alice"]);
        assert!(matches!(s.edit_mut(), Err(Error::EditNotOpen)));
        assert!(matches!(s.commit_edit(), Err(Error::EditNotOpen)));
        assert!(!s.cancel_edit());
    }

    #[test]
    fn reload_evicts_stale_selection_and_refocuses() {
        let mut s = session(&["Alice", "Bob", "Carol"]);
        let alice = s.addresses()[0].id;
        let bob = s.addresses()[1].id;
        s.select_all();

        s.store().delete_address(alice).expect("delete");
        s.reload().expect("reload");

        assert_eq!(names(&s), vec!["Bob", "Carol"]);
        assert!(!s.selection().contains(alice));
        assert_eq!(s.selection().len(), 2);
        assert_eq!(s.focused().map(|a| a.id), Some(bob));
    }

    #[test]
    fn reload_keeps_focus_when_still_listed() {
        let mut s = session(&["Alice", "Bob"]);
        let bob = s.addresses()[1].id;
        s.navigate(bob).expect("navigate");

        s.store()
            .create_address(&AddressFields::named("Aaron"))
            .expect("create");
        s.reload().expect("reload");

        assert_eq!(s.focused().map(|a| a.id), Some(bob));
        assert_eq!(s.focused_index(), Some(2));
    }
}
