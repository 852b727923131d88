//! Single-line text field shared by the login form, the search bar, the
//! command line and the filter form.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a keystroke did to the field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Edited or moved; stay in the field
  Consumed,
  /// Enter, carrying the text at that moment
  Submitted(String),
  /// Esc
  Cancelled,
  /// Not an editing key, let the owner decide
  NotHandled,
}

/// Editable buffer with a cursor. The cursor is a byte offset that always
/// sits on a char boundary, so rupee signs and names with accents edit cleanly.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  text: String,
  cursor: usize,
  masked: bool,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  /// A field whose contents render as bullets
  pub fn masked() -> Self {
    Self {
      masked: true,
      ..Self::default()
    }
  }

  pub fn set_value(&mut self, value: &str) {
    self.text = value.to_string();
    self.cursor = self.text.len();
  }

  pub fn display_value(&self) -> String {
    match self.masked {
      true => "•".repeat(self.text.chars().count()),
      false => self.text.clone(),
    }
  }

  pub fn value(&self) -> &str {
    &self.text
  }

  pub fn is_empty(&self) -> bool {
    self.text.is_empty()
  }

  pub fn clear(&mut self) {
    self.text.clear();
    self.cursor = 0;
  }

  fn prev_boundary(&self) -> Option<usize> {
    self.text[..self.cursor]
      .chars()
      .next_back()
      .map(|c| self.cursor - c.len_utf8())
  }

  fn next_boundary(&self) -> Option<usize> {
    self.text[self.cursor..]
      .chars()
      .next()
      .map(|c| self.cursor + c.len_utf8())
  }

  /// Remove `start..end` and park the cursor at `start`
  fn cut(&mut self, start: usize, end: usize) {
    self.text.replace_range(start..end, "");
    self.cursor = start;
  }

  /// Start of the word left of the cursor, skipping trailing spaces first
  fn word_start(&self) -> usize {
    self.text[..self.cursor]
      .trim_end()
      .rfind(' ')
      .map_or(0, |i| i + 1)
  }

  fn handle_ctrl(&mut self, code: KeyCode) -> Option<InputResult> {
    match code {
      KeyCode::Char('a') | KeyCode::Home => self.cursor = 0,
      KeyCode::Char('e') | KeyCode::End => self.cursor = self.text.len(),
      KeyCode::Char('u') => self.cut(0, self.cursor),
      KeyCode::Char('w') => self.cut(self.word_start(), self.cursor),
      _ => return None,
    }
    Some(InputResult::Consumed)
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
      if let Some(result) = self.handle_ctrl(key.code) {
        return result;
      }
    }

    match key.code {
      KeyCode::Enter => return InputResult::Submitted(self.text.clone()),
      KeyCode::Esc => return InputResult::Cancelled,
      KeyCode::Char(c) => {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
      }
      KeyCode::Backspace => {
        if let Some(start) = self.prev_boundary() {
          self.cut(start, self.cursor);
        }
      }
      KeyCode::Delete => {
        if let Some(end) = self.next_boundary() {
          self.cut(self.cursor, end);
        }
      }
      KeyCode::Left => self.cursor = self.prev_boundary().unwrap_or(self.cursor),
      KeyCode::Right => self.cursor = self.next_boundary().unwrap_or(self.cursor),
      _ => return InputResult::NotHandled,
    }
    InputResult::Consumed
  }
}
