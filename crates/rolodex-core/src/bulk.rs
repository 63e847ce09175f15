//! Bulk label command: attach one label to every selected address.
//!
//! The label is resolved before any attach, so an unknown name aborts with
//! nothing written. Selection is left as-is afterwards.

use serde::Serialize;
use tracing::{info, warn};

use crate::associate;
use crate::error::Result;
use crate::focus::FocusSync;
use crate::model::{Address, Label};
use crate::selection::Selection;
use crate::store::Store;

/// Summary of one bulk label run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelOutcome {
    pub label: Label,
    /// Associations newly created.
    pub attached: usize,
    /// Selected addresses that already carried the label.
    pub already: usize,
    /// Whether the focused detail view was rebuilt.
    pub refreshed_detail: bool,
}

impl LabelOutcome {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.attached + self.already
    }
}

/// Attach `label_name` to every member of `selection`, then rebuild the
/// focused detail view if the focused address was among them.
///
/// `listed` is the current address list, used to find the focused record.
///
/// # Errors
///
/// Returns [`crate::Error::LabelNotFound`] before any attach when the label
/// is unknown, and the first attach error otherwise. Attaches that succeeded
/// before a failure are kept and the detail view is still refreshed. A
/// failed label read during that refresh is logged and never replaces the
/// attach error; the view is then rebuilt from the labels it already showed
/// plus `label_name`.
pub fn apply_label<S: Store + ?Sized>(
    store: &S,
    label_name: &str,
    selection: &Selection,
    focus: &mut FocusSync,
    listed: &[Address],
) -> Result<LabelOutcome> {
    let label = associate::resolve_label(store, label_name)?;

    let focused = focus.focused();
    let mut outcome = LabelOutcome {
        label,
        attached: 0,
        already: 0,
        refreshed_detail: false,
    };
    let mut focused_labeled = false;
    let mut failure = None;

    for id in selection.iter() {
        match associate::attach(store, &outcome.label, id) {
            Ok(attachment) => {
                if attachment.created {
                    outcome.attached += 1;
                } else {
                    outcome.already += 1;
                }
                focused_labeled |= focused == Some(id);
            }
            Err(err) => {
                warn!(%id, label = %outcome.label, error = %err, "bulk label aborted");
                failure = Some(err);
                break;
            }
        }
    }

    if focused_labeled
        && let Some(address) = listed.iter().find(|a| Some(a.id) == focused)
    {
        outcome.refreshed_detail = match focus.refresh(store, address) {
            Ok(refreshed) => refreshed,
            Err(err) => {
                warn!(id = %address.id, error = %err, "label read failed after attach, rebuilding from shown labels");
                let mut labels = focus.known_labels().to_vec();
                if !labels.contains(&outcome.label) {
                    labels.push(outcome.label.clone());
                    labels.sort();
                }
                focus.rebuild(address, labels)
            }
        };
    }

    if let Some(err) = failure {
        return Err(err);
    }

    info!(
        label = %outcome.label,
        attached = outcome.attached,
        already = outcome.already,
        "applied label to selection"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::AddressFields;
    use crate::store::SqliteStore;

    struct Fixture {
        store: SqliteStore,
        alice: Address,
        bob: Address,
        focus: FocusSync,
    }

    fn fixture() -> Fixture {
        let store = SqliteStore::in_memory().expect("store");
        let alice = store
            .create_address(&AddressFields::named("Alice"))
            .expect("create");
        let bob = store
            .create_address(&AddressFields::new("Bob", "1 Main St", "X", "Y", "1"))
            .expect("create");
        store.create_label("Christmas 2024").expect("label");
        let mut focus = FocusSync::new();
        focus.move_focus(&store, &bob).expect("focus");
        Fixture {
            store,
            alice,
            bob,
            focus,
        }
    }

    #[test]
    fn labels_selected_and_refreshes_focused_detail() {
        let mut fx = fixture();
        let mut selection = Selection::new();
        selection.toggle(fx.bob.id);
        let listed = vec![fx.alice.clone(), fx.bob.clone()];

        let outcome = apply_label(
            &fx.store,
            "Christmas 2024",
            &selection,
            &mut fx.focus,
            &listed,
        )
        .expect("apply");

        assert_eq!(outcome.attached, 1);
        assert!(outcome.refreshed_detail);
        assert_eq!(
            fx.focus.detail().expect("detail").label_line(),
            "Christmas 2024"
        );
        assert!(selection.contains(fx.bob.id));
        assert!(fx.store.labels_for(fx.alice.id).expect("labels").is_empty());
    }

    #[test]
    fn unfocused_targets_leave_detail_alone() {
        let mut fx = fixture();
        let mut selection = Selection::new();
        selection.toggle(fx.alice.id);
        let before = fx.focus.detail().cloned();
        let listed = vec![fx.alice.clone(), fx.bob.clone()];

        let outcome = apply_label(
            &fx.store,
            "Christmas 2024",
            &selection,
            &mut fx.focus,
            &listed,
        )
        .expect("apply");

        assert!(!outcome.refreshed_detail);
        assert_eq!(fx.focus.detail().cloned(), before);
    }

    #[test]
    fn unknown_label_writes_nothing() {
        let mut fx = fixture();
        let mut selection = Selection::new();
        selection.set_all([fx.alice.id, fx.bob.id]);
        let listed = vec![fx.alice.clone(), fx.bob.clone()];

        let err = apply_label(&fx.store, "Easter", &selection, &mut fx.focus, &listed)
            .expect_err("unknown label");
        assert!(matches!(err, Error::LabelNotFound { .. }));
        assert!(fx.store.labels_for(fx.bob.id).expect("labels").is_empty());
    }

    #[test]
    fn relabeling_counts_existing_associations() {
        let mut fx = fixture();
        let mut selection = Selection::new();
        selection.set_all([fx.alice.id, fx.bob.id]);
        let listed = vec![fx.alice.clone(), fx.bob.clone()];

        apply_label(&fx.store, "Christmas 2024", &selection, &mut fx.focus, &listed)
            .expect("first");
        let second = apply_label(&fx.store, "Christmas 2024", &selection, &mut fx.focus, &listed)
            .expect("second");

        assert_eq!(second.attached, 0);
        assert_eq!(second.already, 2);
        assert_eq!(second.total(), 2);
    }
}
