use super::input::{InputResult, TextInput};
use super::{corner_popup, prompt_line, KeyResult};
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

const MAX_SUGGESTIONS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
  /// Full command line, with the highlighted suggestion filled in
  Submitted(String),
  Cancelled,
}

/// The `:` command line and its suggestion list
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  input: TextInput,
  open: bool,
  highlighted: usize,
}

impl CommandInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.open
  }

  pub fn value(&self) -> &str {
    self.input.value()
  }

  pub fn activate(&mut self) {
    self.open = true;
    self.input.clear();
    self.highlighted = 0;
  }

  fn close(&mut self) {
    self.open = false;
    self.input.clear();
    self.highlighted = 0;
  }

  pub fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(self.input.value())
  }

  /// Move the highlight by `step`, wrapping at both ends
  fn cycle(&mut self, step: isize) {
    let count = self.suggestions().len();
    if count > 0 {
      self.highlighted = (self.highlighted as isize + step).rem_euclid(count as isize) as usize;
    }
  }

  /// Typed text with the highlighted command name substituted in
  fn resolve(&self) -> String {
    match self.suggestions().get(self.highlighted) {
      Some(cmd) => commands::complete(self.input.value(), cmd),
      None => self.input.value().trim().to_lowercase(),
    }
  }

  /// Feed every key here; `:` opens the line when it is closed.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CommandEvent> {
    if !self.open {
      if key.code != KeyCode::Char(':') {
        return KeyResult::NotHandled;
      }
      self.activate();
      return KeyResult::Handled;
    }

    match key.code {
      KeyCode::Esc => {
        self.close();
        KeyResult::Event(CommandEvent::Cancelled)
      }
      KeyCode::Enter => {
        let line = self.resolve();
        self.close();
        KeyResult::Event(CommandEvent::Submitted(line))
      }
      KeyCode::Tab | KeyCode::Down => {
        self.cycle(1);
        KeyResult::Handled
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.cycle(-1);
        KeyResult::Handled
      }
      _ => match self.input.handle_key(key) {
        InputResult::NotHandled => KeyResult::NotHandled,
        _ => {
          // The suggestion list changed under the highlight
          self.highlighted = 0;
          KeyResult::Handled
        }
      },
    }
  }

  fn suggestion_items(suggestions: &[&Command]) -> Vec<ListItem<'static>> {
    suggestions
      .iter()
      .take(MAX_SUGGESTIONS)
      .map(|cmd| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<12}", cmd.name), Style::default().fg(Color::Cyan)),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect()
  }

  /// Drawn in the top-left corner of `area`; nothing when closed.
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.open {
      return;
    }

    let suggestions = self.suggestions();
    let rows = suggestions.len().min(MAX_SUGGESTIONS) as u16;
    let popup = corner_popup(area, 3 + rows);

    frame.render_widget(Clear, popup);
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Command ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    if inner.height == 0 {
      return;
    }

    let [prompt_area, list_area] =
      Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

    frame.render_widget(Paragraph::new(prompt_line(":", self.input.value())), prompt_area);

    if rows > 0 && list_area.height > 0 {
      let list = List::new(Self::suggestion_items(&suggestions))
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
      let mut state = ListState::default().with_selected(Some(self.highlighted));
      frame.render_stateful_widget(list, list_area, &mut state);
    }
  }
}
