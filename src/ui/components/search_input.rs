use super::input::{InputResult, TextInput};
use super::{corner_popup, prompt_line, KeyResult};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// The query after every edit; empty when the search is cancelled
  Changed(String),
  /// Box closed with Enter, query still applied
  Submitted,
}

/// `/` search box. Enter closes it but leaves the query in force, and the
/// next `/` reopens it with that query ready to edit.
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  open: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.open
  }

  pub fn query(&self) -> &str {
    self.input.value()
  }

  pub fn activate(&mut self) {
    self.open = true;
  }

  /// Forget the query; the box stays however it was
  pub fn clear(&mut self) {
    self.input.clear();
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.open {
      return match key.code {
        KeyCode::Char('/') => {
          self.activate();
          KeyResult::Handled
        }
        _ => KeyResult::NotHandled,
      };
    }

    let event = match self.input.handle_key(key) {
      InputResult::Consumed => SearchEvent::Changed(self.query().to_string()),
      InputResult::Submitted(_) => {
        self.open = false;
        SearchEvent::Submitted
      }
      InputResult::Cancelled => {
        self.open = false;
        self.input.clear();
        SearchEvent::Changed(String::new())
      }
      // Modal while open
      InputResult::NotHandled => return KeyResult::Handled,
    };
    KeyResult::Event(event)
  }

  /// Draw the box with `matches` in its bottom border; nothing when closed.
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect, matches: usize) {
    if !self.open {
      return;
    }

    let popup = corner_popup(area, 3);
    frame.render_widget(Clear, popup);

    let noun = if matches == 1 { "match" } else { "matches" };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Search ")
      .title_bottom(Line::from(format!(" {matches} {noun} ")).right_aligned());
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    if inner.height > 0 {
      frame.render_widget(Paragraph::new(prompt_line("/", self.query())), inner);
    }
  }
}
