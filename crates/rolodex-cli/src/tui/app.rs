//! Interactive address book view.
//!
//! Holds the core [`Session`] and turns key presses into session events.
//! Core errors never end the program; they land in the status bar.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::widgets::TableState;
use rolodex_core::{Session, Store};
use std::time::Instant;
use tracing::{debug, warn};

use super::edit_dialog::{self, EditAction, EditDialogState, char_len};
use super::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Browsing the list.
    #[default]
    Normal,
    /// Edit modal open over the focused address.
    Edit,
    /// Typing the label to apply to the selection.
    LabelPrompt,
    /// Hotkey overlay with a filter query.
    Help,
}

pub struct AddressBookView<S: Store> {
    pub(super) session: Session<S>,
    pub(super) table_state: TableState,
    pub(super) input_mode: InputMode,
    pub(super) edit_dialog: Option<EditDialogState>,
    pub(super) label_input: String,
    pub(super) label_cursor: usize,
    default_label: Option<String>,
    pub(super) help_query: String,
    pub(super) status_msg: Option<(String, Instant)>,
    should_quit: bool,
}

impl<S: Store> AddressBookView<S> {
    pub fn new(session: Session<S>, default_label: Option<String>) -> Self {
        let mut view = Self {
            session,
            table_state: TableState::default(),
            input_mode: InputMode::Normal,
            edit_dialog: None,
            label_input: String::new(),
            label_cursor: 0,
            default_label,
            help_query: String::new(),
            status_msg: None,
            should_quit: false,
        };
        view.sync_table();
        view
    }

    pub const fn session(&self) -> &Session<S> {
        &self.session
    }

    pub const fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_msg = Some((msg, Instant::now()));
    }

    /// Returns true once the user asked to quit.
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Render the view into `area` within the given frame.
    pub fn render(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        render::render_into(frame, self, area);
    }

    fn report(&mut self, action: &str, err: &rolodex_core::Error) {
        warn!(action, error = %err, code = %err.code(), "tui action failed");
        self.set_status(format!("{action} failed: {err}"));
    }

    fn sync_table(&mut self) {
        self.table_state.select(self.session.focused_index());
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    fn focus_index(&mut self, idx: usize) {
        let Some(id) = self.session.addresses().get(idx).map(|a| a.id) else {
            return;
        };
        if let Err(err) = self.session.navigate(id) {
            self.report("Navigate", &err);
        }
        self.sync_table();
    }

    fn select_next(&mut self) {
        let len = self.session.addresses().len();
        if len == 0 {
            return;
        }
        let next = self
            .session
            .focused_index()
            .map_or(0, |idx| (idx + 1).min(len - 1));
        self.focus_index(next);
    }

    fn select_prev(&mut self) {
        let prev = self
            .session
            .focused_index()
            .map_or(0, |idx| idx.saturating_sub(1));
        self.focus_index(prev);
    }

    fn select_first(&mut self) {
        self.focus_index(0);
    }

    fn select_last(&mut self) {
        let len = self.session.addresses().len();
        if len > 0 {
            self.focus_index(len - 1);
        }
    }

    // -----------------------------------------------------------------------
    // Key event handling
    // -----------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match self.input_mode {
            InputMode::Edit => self.handle_edit_key(key),
            InputMode::LabelPrompt => self.handle_label_key(key),
            InputMode::Help => self.handle_help_key(key),
            InputMode::Normal => self.handle_normal_key(key, ctrl),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            // Quit
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,

            // Selection
            KeyCode::Char('a') if ctrl => {
                self.session.select_all();
                self.set_status(format!("Selected {}", self.session.selection().len()));
            }
            KeyCode::Char('d') if ctrl => {
                self.session.select_none();
                self.set_status("Selection cleared".to_string());
            }
            KeyCode::Char('l') if ctrl => self.reload(),

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('g') | KeyCode::Home => self.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.select_last(),

            KeyCode::Char('s' | ' ') => {
                if let Err(err) = self.session.toggle_focused() {
                    self.report("Toggle", &err);
                }
            }
            KeyCode::Char('e') => self.open_edit(),
            KeyCode::Char('l') => self.open_label_prompt(),
            KeyCode::Char('?') => {
                self.help_query.clear();
                self.input_mode = InputMode::Help;
            }
            _ => {}
        }
    }

    fn reload(&mut self) {
        match self.session.reload() {
            Ok(()) => {
                let count = self.session.addresses().len();
                self.set_status(format!("Reloaded {count} addresses"));
            }
            Err(err) => self.report("Reload", &err),
        }
        self.sync_table();
    }

    // -----------------------------------------------------------------------
    // Edit modal
    // -----------------------------------------------------------------------

    fn open_edit(&mut self) {
        match self.session.open_edit() {
            Ok(tx) => {
                self.edit_dialog = Some(EditDialogState::open(tx.draft()));
                self.input_mode = InputMode::Edit;
            }
            Err(err) => self.report("Edit", &err),
        }
    }

    fn close_edit(&mut self) {
        self.edit_dialog = None;
        self.input_mode = InputMode::Normal;
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.edit_dialog.as_mut() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        let action = match self.session.edit_mut() {
            Ok(fields) => dialog.handle_key(fields, key),
            Err(err) => {
                self.report("Edit", &err);
                self.close_edit();
                return;
            }
        };

        match action {
            EditAction::None => {}
            EditAction::Cancel => {
                self.session.cancel_edit();
                self.close_edit();
                self.set_status("Edit cancelled".to_string());
            }
            EditAction::Submit => match self.session.commit_edit() {
                Ok(saved) => {
                    debug!(id = %saved.id, "edit saved from tui");
                    self.close_edit();
                    self.sync_table();
                    self.set_status(format!("Saved {}", saved.name));
                }
                Err(err) => self.report("Save", &err),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Label prompt
    // -----------------------------------------------------------------------

    fn open_label_prompt(&mut self) {
        self.label_input = self.default_label.clone().unwrap_or_default();
        self.label_cursor = char_len(&self.label_input);
        self.input_mode = InputMode::LabelPrompt;
    }

    fn handle_label_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => self.apply_label(),
            _ => {
                edit_dialog::edit_single_line(&mut self.label_input, &mut self.label_cursor, key);
            }
        }
    }

    fn apply_label(&mut self) {
        let name = self.label_input.trim().to_string();
        match self.session.apply_label(&name) {
            Ok(outcome) => {
                self.input_mode = InputMode::Normal;
                if outcome.total() == 0 {
                    self.set_status("No addresses selected".to_string());
                } else {
                    self.set_status(format!(
                        "Labeled {} with '{}' ({} new)",
                        outcome.total(),
                        outcome.label,
                        outcome.attached
                    ));
                }
            }
            Err(err) => {
                self.report("Label", &err);
                // A partial run may have labeled the focused entry.
                self.sync_table();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Help overlay
    // -----------------------------------------------------------------------

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.help_query.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.help_query.pop();
            }
            KeyCode::Char(c) => self.help_query.push(c),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_core::{AddressFields, EditField, SqliteStore, Store};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str<S: Store>(view: &mut AddressBookView<S>, s: &str) {
        for c in s.chars() {
            view.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn view() -> AddressBookView<SqliteStore> {
        let store = SqliteStore::in_memory().expect("store");
        store
            .create_address(&AddressFields::named("Alice"))
            .expect("alice");
        store
            .create_address(&AddressFields::new("Bob", "1 Main St", "X", "Y", "1"))
            .expect("bob");
        store.create_label("Christmas 2024").expect("label");
        let session = Session::open(store).expect("session");
        AddressBookView::new(session, Some("Christmas 2024".to_string()))
    }

    fn focused_name<S: Store>(view: &AddressBookView<S>) -> Option<String> {
        view.session().focused().map(|a| a.name.clone())
    }

    #[test]
    fn navigation_moves_focus_and_table() {
        let mut view = view();
        assert_eq!(focused_name(&view).as_deref(), Some("Alice"));
        assert_eq!(view.table_state.selected(), Some(0));

        view.handle_key(key(KeyCode::Char('j')));
        assert_eq!(focused_name(&view).as_deref(), Some("Bob"));
        view.handle_key(key(KeyCode::Down));
        assert_eq!(view.table_state.selected(), Some(1));

        view.handle_key(key(KeyCode::Char('g')));
        assert_eq!(focused_name(&view).as_deref(), Some("Alice"));
        view.handle_key(key(KeyCode::Char('G')));
        assert_eq!(focused_name(&view).as_deref(), Some("Bob"));
    }

    #[test]
    fn selection_keys() {
        let mut view = view();
        view.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(view.session().selection().len(), 1);
        view.handle_key(key(KeyCode::Char('s')));
        assert!(view.session().selection().is_empty());

        view.handle_key(ctrl('a'));
        assert_eq!(view.session().selection().len(), 2);
        view.handle_key(ctrl('d'));
        assert!(view.session().selection().is_empty());
    }

    #[test]
    fn label_prompt_applies_default_label_to_selection() {
        let mut view = view();
        view.handle_key(key(KeyCode::Char('j')));
        view.handle_key(key(KeyCode::Char('s')));
        view.handle_key(key(KeyCode::Char('l')));
        assert_eq!(view.input_mode(), InputMode::LabelPrompt);
        assert_eq!(view.label_input, "Christmas 2024");

        view.handle_key(key(KeyCode::Enter));
        assert_eq!(view.input_mode(), InputMode::Normal);
        let detail = view.session().detail().expect("detail");
        assert_eq!(detail.label_line(), "Christmas 2024");
        assert_eq!(view.session().selection().len(), 1);
    }

    #[test]
    fn unknown_label_keeps_prompt_open_with_status() {
        let mut view = view();
        view.handle_key(key(KeyCode::Char('s')));
        view.handle_key(key(KeyCode::Char('l')));
        for _ in 0..4 {
            view.handle_key(key(KeyCode::Backspace));
        }
        type_str(&mut view, "1999");
        assert_eq!(view.label_input, "Christmas 1999");

        view.handle_key(key(KeyCode::Enter));
        assert_eq!(view.input_mode(), InputMode::LabelPrompt);
        let (msg, _) = view.status_msg.as_ref().expect("status");
        assert!(msg.contains("Christmas 1999"));

        view.handle_key(key(KeyCode::Esc));
        assert_eq!(view.input_mode(), InputMode::Normal);
    }

    #[test]
    fn edit_modal_commits_working_copy() {
        let mut view = view();
        view.handle_key(key(KeyCode::Char('e')));
        assert_eq!(view.input_mode(), InputMode::Edit);

        // Name -> Nickname -> Street
        view.handle_key(key(KeyCode::Tab));
        view.handle_key(key(KeyCode::Tab));
        type_str(&mut view, "42 Elm");
        view.handle_key(key(KeyCode::Tab));
        type_str(&mut view, "Town");
        view.handle_key(key(KeyCode::Tab));
        type_str(&mut view, "ST");
        view.handle_key(key(KeyCode::Tab));
        type_str(&mut view, "00000");
        assert_eq!(
            view.edit_dialog.as_ref().map(|d| d.focus),
            Some(EditField::Zipcode)
        );

        view.handle_key(key(KeyCode::Enter));
        assert_eq!(view.input_mode(), InputMode::Normal);
        assert!(view.session().edit().is_none());
        let alice = view.session().focused().expect("focused");
        assert!(alice.is_complete());
        let texts: Vec<_> = view
            .session()
            .detail()
            .expect("detail")
            .lines
            .iter()
            .map(|l| l.text.clone())
            .collect();
        assert_eq!(texts, vec!["42 Elm", "Town, ST 00000", "", ""]);
    }

    #[test]
    fn blank_name_keeps_modal_open() {
        let mut view = view();
        view.handle_key(key(KeyCode::Char('e')));
        for _ in 0..5 {
            view.handle_key(key(KeyCode::Backspace));
        }
        view.handle_key(key(KeyCode::Enter));
        assert_eq!(view.input_mode(), InputMode::Edit);
        assert!(view.session().edit().is_some());

        view.handle_key(key(KeyCode::Esc));
        assert_eq!(view.input_mode(), InputMode::Normal);
        assert_eq!(focused_name(&view).as_deref(), Some("Alice"));
    }

    #[test]
    fn help_overlay_filters_and_closes() {
        let mut view = view();
        view.handle_key(key(KeyCode::Char('?')));
        assert_eq!(view.input_mode(), InputMode::Help);
        type_str(&mut view, "q");
        assert_eq!(view.help_query, "q");
        assert!(!view.should_quit());
        view.handle_key(key(KeyCode::Esc));
        assert_eq!(view.input_mode(), InputMode::Normal);

        view.handle_key(key(KeyCode::Char('q')));
        assert!(view.should_quit());
    }

    #[test]
    fn empty_book_reports_instead_of_failing() {
        let session = Session::open(SqliteStore::in_memory().expect("store")).expect("session");
        let mut view = AddressBookView::new(session, None);
        view.handle_key(key(KeyCode::Char('j')));
        view.handle_key(key(KeyCode::Char('s')));
        assert!(view.status_msg.is_some());
        view.handle_key(key(KeyCode::Char('e')));
        assert_eq!(view.input_mode(), InputMode::Normal);
    }
}
