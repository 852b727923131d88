use crate::dataview::compare::{compare, ComparisonRow};
use crate::dataview::format::format_inr;
use crate::directory::Employee;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{truncate, winner_colors};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, List, ListItem, ListState, Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
  Left,
  Right,
}

/// Pick two employees and compare them metric by metric
pub struct CompareView {
  records: Vec<Employee>,
  focus: Side,
  left: ListState,
  right: ListState,
}

impl CompareView {
  /// Defaults to the first and second record
  pub fn new(records: Vec<Employee>) -> Self {
    let mut left = ListState::default();
    let mut right = ListState::default();
    left.select(Some(0));
    right.select(Some(if records.len() > 1 { 1 } else { 0 }));

    Self {
      records,
      focus: Side::Left,
      left,
      right,
    }
  }

  fn pair(&self) -> Option<(&Employee, &Employee)> {
    let left = self.records.get(self.left.selected()?)?;
    let right = self.records.get(self.right.selected()?)?;
    Some((left, right))
  }

  fn rows(&self) -> Vec<ComparisonRow> {
    match self.pair() {
      Some((left, right)) => compare(left, right, format_inr),
      None => Vec::new(),
    }
  }

  fn focused_state(&mut self) -> &mut ListState {
    match self.focus {
      Side::Left => &mut self.left,
      Side::Right => &mut self.right,
    }
  }

  fn move_selection(&mut self, delta: isize) {
    let len = self.records.len();
    if len == 0 {
      return;
    }
    let state = self.focused_state();
    let current = state.selected().unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(len as isize) as usize;
    state.select(Some(next));
  }

  fn render_picker(&mut self, frame: &mut Frame, area: Rect, side: Side) {
    let focused = self.focus == side;
    let title = match side {
      Side::Left => " Employee A ",
      Side::Right => " Employee B ",
    };
    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));

    let width = area.width.saturating_sub(8) as usize;
    let items: Vec<ListItem> = self
      .records
      .iter()
      .map(|e| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("[{}] ", e.initial()), Style::default().fg(Color::Yellow)),
          Span::raw(truncate(&e.name, width)),
        ]))
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).bold())
      .highlight_symbol("> ");

    let len = self.records.len();
    let state = match side {
      Side::Left => &mut self.left,
      Side::Right => &mut self.right,
    };
    ensure_valid_selection(state, len);
    frame.render_stateful_widget(list, area, state);
  }

  fn render_table(&self, frame: &mut Frame, area: Rect) {
    let (left_name, right_name) = match self.pair() {
      Some((l, r)) => (l.name.clone(), r.name.clone()),
      None => (String::new(), String::new()),
    };

    let header = Row::new(vec![
      Cell::from("Metric"),
      Cell::from(left_name),
      Cell::from(right_name),
    ])
    .style(Style::default().fg(Color::Yellow).bold());

    let rows: Vec<Row> = self
      .rows()
      .into_iter()
      .map(|row| {
        let (left_color, right_color) = winner_colors(row.winner);
        Row::new(vec![
          Cell::from(row.label).style(Style::default().fg(Color::DarkGray)),
          Cell::from(row.left).style(Style::default().fg(left_color)),
          Cell::from(row.right).style(Style::default().fg(right_color)),
        ])
      })
      .collect();

    let table = Table::new(
      rows,
      [Constraint::Length(12), Constraint::Min(10), Constraint::Min(10)],
    )
    .header(header)
    .block(
      Block::default()
        .title(" Comparison ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(table, area);
  }
}

impl View for CompareView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Tab | KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
        self.focus = match self.focus {
          Side::Left => Side::Right,
          Side::Right => Side::Left,
        };
      }
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(6), Constraint::Length(9)])
      .split(area);
    let pickers = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
      .split(chunks[0]);

    self.render_picker(frame, pickers[0], Side::Left);
    self.render_picker(frame, pickers[1], Side::Right);
    self.render_table(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    "Compare".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("tab", "switch side").with_priority(10),
      ShortcutInfo::new("j/k", "select").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
