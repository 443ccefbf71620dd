use crossterm::event::{Event, KeyCode, KeyEvent};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::contact::{CategorySet, Draft, DraftField};
use crate::phone;

/// Widget state behind the add/edit modal. The authoritative draft lives in
/// the controller; this only tracks cursors and focus.
pub struct FormEditor {
    focus: DraftField,
    name: Input,
    number: Input,
    category_cursor: Option<usize>,
}

impl Default for FormEditor {
    fn default() -> Self {
        Self {
            focus: DraftField::Name,
            name: Input::default(),
            number: Input::default(),
            category_cursor: None,
        }
    }
}

impl FormEditor {
    pub fn open(&mut self, draft: &Draft, categories: &CategorySet) {
        self.focus = DraftField::Name;
        self.name = Input::new(draft.name.clone());
        self.number = Input::new(draft.number.clone());
        self.category_cursor = categories.position(&draft.category);
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn focus(&self) -> DraftField {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn value(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => self.name.value(),
            DraftField::Number => self.number.value(),
            DraftField::Category => "",
        }
    }

    /// Cursor column inside the focused text input, if one has focus.
    pub fn visual_cursor(&self) -> Option<usize> {
        match self.focus {
            DraftField::Name => Some(self.name.visual_cursor()),
            DraftField::Number => Some(self.number.visual_cursor()),
            DraftField::Category => None,
        }
    }

    pub fn category_cursor(&self) -> Option<usize> {
        self.category_cursor
    }

    /// Feed a key to the focused text input. Returns the new value when the
    /// text changed. The number field drops characters a phone keypad
    /// would not offer.
    pub fn handle_text_key(&mut self, key: KeyEvent) -> Option<(DraftField, String)> {
        let field = self.focus;
        if field == DraftField::Number {
            if let KeyCode::Char(c) = key.code {
                if !phone::accepts_char(c) {
                    return None;
                }
            }
        }

        let input = match field {
            DraftField::Name => &mut self.name,
            DraftField::Number => &mut self.number,
            DraftField::Category => return None,
        };
        let before = input.value().to_string();
        input.handle_event(&Event::Key(key));
        if input.value() == before {
            return None;
        }
        Some((field, input.value().to_string()))
    }

    /// Move the category highlight and return the newly chosen category.
    /// From an empty choice, forward picks the first entry and backward the
    /// last.
    pub fn step_category(&mut self, delta: isize, categories: &CategorySet) -> Option<String> {
        let len = categories.len();
        if len == 0 {
            return None;
        }
        let next = match self.category_cursor {
            None if delta >= 0 => 0,
            None => len - 1,
            Some(current) => {
                let len = len as isize;
                (((current as isize + delta) % len + len) % len) as usize
            }
        };
        self.category_cursor = Some(next);
        categories
            .options()
            .get(next)
            .map(|o| o.category.as_str().to_string())
    }
}
