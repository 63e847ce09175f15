//! Focus/detail sync.
//!
//! A two-state machine: `Unfocused` while the list is empty, otherwise
//! `Focused(id)`. Every transition into `Focused` and every explicit
//! [`FocusSync::refresh`] rebuilds the [`DetailView`] from the store. When
//! the label read fails right after a successful write, callers rebuild the
//! view with [`FocusSync::rebuild`] from labels they already know; the view
//! is never patched in place.

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{Address, AddressId, Label};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Unfocused,
    Focused(AddressId),
}

/// Role of one rendered detail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLineKind {
    Nickname,
    Street,
    CityStateZip,
    Blank,
    Labels,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailLine {
    pub kind: DetailLineKind,
    pub text: String,
}

impl DetailLine {
    fn new(kind: DetailLineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    fn blank() -> Self {
        Self::new(DetailLineKind::Blank, "")
    }
}

/// Read-only projection of the focused address and its labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub address: Address,
    pub labels: Vec<Label>,
    pub lines: Vec<DetailLine>,
}

impl DetailView {
    /// Derive the view for `address` with an already-resolved label set.
    #[must_use]
    pub fn build(address: Address, labels: Vec<Label>) -> Self {
        let lines = detail_lines(&address, &labels);
        Self {
            address,
            labels,
            lines,
        }
    }

    /// Resolve labels through the store and derive the view.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the label lookup fails.
    pub fn load<S: Store + ?Sized>(store: &S, address: &Address) -> Result<Self> {
        let labels = store.labels_for(address.id)?;
        Ok(Self::build(address.clone(), labels))
    }

    /// The trailing comma-joined label summary.
    #[must_use]
    pub fn label_line(&self) -> &str {
        self.lines
            .iter()
            .rev()
            .find(|line| line.kind == DetailLineKind::Labels)
            .map_or("", |line| line.text.as_str())
    }
}

/// Nickname banner (plus spacer) when set, the postal block (plus spacer)
/// only for complete records, then the label summary.
#[must_use]
pub fn detail_lines(address: &Address, labels: &[Label]) -> Vec<DetailLine> {
    let mut lines = Vec::with_capacity(6);

    if let Some(nickname) = address.nickname() {
        lines.push(DetailLine::new(DetailLineKind::Nickname, nickname));
        lines.push(DetailLine::blank());
    }

    if address.is_complete() {
        lines.push(DetailLine::new(DetailLineKind::Street, address.street.as_str()));
        lines.push(DetailLine::new(
            DetailLineKind::CityStateZip,
            format!("{}, {} {}", address.city, address.state, address.zipcode),
        ));
        lines.push(DetailLine::blank());
    }

    let summary = labels
        .iter()
        .map(Label::name)
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(DetailLine::new(DetailLineKind::Labels, summary));

    lines
}

#[derive(Debug, Clone, Default)]
pub struct FocusSync {
    state: FocusState,
    detail: Option<DetailView>,
}

impl FocusSync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> FocusState {
        self.state
    }

    #[must_use]
    pub const fn focused(&self) -> Option<AddressId> {
        match self.state {
            FocusState::Unfocused => None,
            FocusState::Focused(id) => Some(id),
        }
    }

    #[must_use]
    pub const fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    /// Focus `address` and rebuild the detail view. On error the previous
    /// focus and view are kept.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the label lookup fails.
    pub fn move_focus<S: Store + ?Sized>(&mut self, store: &S, address: &Address) -> Result<()> {
        let view = DetailView::load(store, address)?;
        debug!(id = %address.id, from = ?self.state, "focus moved");
        self.state = FocusState::Focused(address.id);
        self.detail = Some(view);
        Ok(())
    }

    /// Rebuild the view for `address` if it is the focused one, without a
    /// focus change. Returns whether a rebuild happened.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the label lookup fails.
    pub fn refresh<S: Store + ?Sized>(&mut self, store: &S, address: &Address) -> Result<bool> {
        if self.focused() != Some(address.id) {
            return Ok(false);
        }
        self.detail = Some(DetailView::load(store, address)?);
        debug!(id = %address.id, "detail view recomputed");
        Ok(true)
    }

    /// Rebuild the view for `address` from a label set the caller already
    /// knows, without reading the store. Returns `false` and does nothing
    /// if `address` is not the focused one.
    pub fn rebuild(&mut self, address: &Address, labels: Vec<Label>) -> bool {
        if self.focused() != Some(address.id) {
            return false;
        }
        self.detail = Some(DetailView::build(address.clone(), labels));
        debug!(id = %address.id, "detail view rebuilt from known labels");
        true
    }

    /// Labels carried by the current detail view.
    #[must_use]
    pub fn known_labels(&self) -> &[Label] {
        self.detail.as_ref().map_or(&[], |view| view.labels.as_slice())
    }

    /// Enter `Unfocused`; used when the list becomes empty.
    pub fn clear(&mut self) {
        if self.state != FocusState::Unfocused {
            debug!(from = ?self.state, "focus cleared");
        }
        self.state = FocusState::Unfocused;
        self.detail = None;
    }
}
