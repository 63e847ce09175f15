//! Six-field edit modal over the session's open edit transaction.
//!
//! The dialog only tracks which field has focus and where the cursor sits.
//! Text lives in the transaction's working copy so a cancel drops it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rolodex_core::{AddressFields, EditField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    None,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDialogState {
    pub focus: EditField,
    pub cursor: usize,
}

impl EditDialogState {
    /// Focus the name field with the cursor at its end.
    pub fn open(fields: &AddressFields) -> Self {
        Self {
            focus: EditField::Name,
            cursor: char_len(fields.get(EditField::Name)),
        }
    }

    fn focus_field(&mut self, field: EditField, fields: &AddressFields) {
        self.focus = field;
        self.cursor = char_len(fields.get(field));
    }

    pub fn handle_key(&mut self, fields: &mut AddressFields, key: KeyEvent) -> EditAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Esc => return EditAction::Cancel,
            KeyCode::Char('s') if ctrl => return EditAction::Submit,
            KeyCode::Enter => return EditAction::Submit,
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_field(self.focus.prev(), fields);
                return EditAction::None;
            }
            KeyCode::Tab if shift => {
                self.focus_field(self.focus.prev(), fields);
                return EditAction::None;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus_field(self.focus.next(), fields);
                return EditAction::None;
            }
            _ => {}
        }

        if ctrl {
            return EditAction::None;
        }

        let mut text = fields.get(self.focus).to_string();
        if edit_single_line(&mut text, &mut self.cursor, key) {
            fields.set(self.focus, text);
        }
        EditAction::None
    }
}

/// Apply one editing key to `text`. Returns true when the text changed.
pub fn edit_single_line(text: &mut String, cursor: &mut usize, key: KeyEvent) -> bool {
    *cursor = (*cursor).min(char_len(text));
    match key.code {
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(char_len(text)),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = char_len(text),
        KeyCode::Backspace => {
            if *cursor > 0 {
                let remove_idx = *cursor - 1;
                remove_char_at(text, remove_idx);
                *cursor = remove_idx;
                return true;
            }
        }
        KeyCode::Delete => {
            if *cursor < char_len(text) {
                remove_char_at(text, *cursor);
                return true;
            }
        }
        KeyCode::Char(c) => {
            insert_char_at(text, *cursor, c);
            *cursor += 1;
            return true;
        }
        _ => {}
    }
    false
}

pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn byte_index_at_char(value: &str, char_idx: usize) -> usize {
    value
        .char_indices()
        .nth(char_idx)
        .map_or(value.len(), |(idx, _)| idx)
}

fn insert_char_at(value: &mut String, char_idx: usize, ch: char) {
    let idx = byte_index_at_char(value, char_idx);
    value.insert(idx, ch);
}

fn remove_char_at(value: &mut String, char_idx: usize) {
    if char_idx >= char_len(value) {
        return;
    }
    let start = byte_index_at_char(value, char_idx);
    let end = byte_index_at_char(value, char_idx + 1);
    value.replace_range(start..end, "");
}

/// `value` with a block cursor drawn at `char_idx`.
pub fn with_cursor(value: &str, char_idx: usize) -> String {
    let mut out = String::with_capacity(value.len() + 3);
    let mut inserted = false;
    for (idx, ch) in value.chars().enumerate() {
        if idx == char_idx {
            out.push('█');
            inserted = true;
        }
        out.push(ch);
    }
    if !inserted {
        out.push('█');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(dialog: &mut EditDialogState, fields: &mut AddressFields, s: &str) {
        for c in s.chars() {
            assert_eq!(dialog.handle_key(fields, key(KeyCode::Char(c))), EditAction::None);
        }
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut fields = AddressFields::named("Al");
        let mut dialog = EditDialogState::open(&fields);
        type_str(&mut dialog, &mut fields, "ice");
        assert_eq!(fields.name, "Alice");

        dialog.handle_key(&mut fields, key(KeyCode::Tab));
        assert_eq!(dialog.focus, EditField::Nickname);
        type_str(&mut dialog, &mut fields, "Ally");
        assert_eq!(fields.nickname.as_deref(), Some("Ally"));
    }

    #[test]
    fn clearing_the_nickname_unsets_it() {
        let mut fields = AddressFields::named("Bob").with_nickname("B");
        let mut dialog = EditDialogState::open(&fields);
        dialog.handle_key(&mut fields, key(KeyCode::Tab));
        assert_eq!(dialog.cursor, 1);
        dialog.handle_key(&mut fields, key(KeyCode::Backspace));
        assert_eq!(fields.nickname, None);
    }

    #[test]
    fn tab_cycles_and_back_tab_reverses() {
        let mut fields = AddressFields::default();
        let mut dialog = EditDialogState::open(&fields);
        for _ in 0..6 {
            dialog.handle_key(&mut fields, key(KeyCode::Tab));
        }
        assert_eq!(dialog.focus, EditField::Name);
        dialog.handle_key(&mut fields, key(KeyCode::BackTab));
        assert_eq!(dialog.focus, EditField::Zipcode);
        dialog.handle_key(
            &mut fields,
            KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT),
        );
        assert_eq!(dialog.focus, EditField::State);
    }

    #[test]
    fn submit_and_cancel_keys() {
        let mut fields = AddressFields::named("X");
        let mut dialog = EditDialogState::open(&fields);
        assert_eq!(dialog.handle_key(&mut fields, key(KeyCode::Enter)), EditAction::Submit);
        assert_eq!(
            dialog.handle_key(
                &mut fields,
                KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
            ),
            EditAction::Submit
        );
        assert_eq!(dialog.handle_key(&mut fields, key(KeyCode::Esc)), EditAction::Cancel);
        assert_eq!(fields.name, "X");
    }

    #[test]
    fn cursor_edits_respect_multibyte_chars() {
        let mut text = "Zoë".to_string();
        let mut cursor = 3;
        edit_single_line(&mut text, &mut cursor, key(KeyCode::Left));
        edit_single_line(&mut text, &mut cursor, key(KeyCode::Delete));
        assert_eq!(text, "Zo");
        edit_single_line(&mut text, &mut cursor, key(KeyCode::Char('é')));
        assert_eq!(text, "Zoé");
        assert_eq!(with_cursor(&text, 0), "█Zoé");
        assert_eq!(with_cursor(&text, 3), "Zoé█");
    }
}
