use crate::app::AppContext;
use crate::ui::centered_rect;
use crate::ui::components::{InputResult, Notice, TextInput};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::DashboardView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Username,
  Password,
}

/// Username / password form shown when no session exists
pub struct LoginView {
  ctx: AppContext,
  username: TextInput,
  password: TextInput,
  focus: Field,
  error: Option<String>,
  notice: Option<Notice>,
}

impl LoginView {
  pub fn new(ctx: AppContext) -> Self {
    Self {
      ctx,
      username: TextInput::new(),
      password: TextInput::masked(),
      focus: Field::Username,
      error: None,
      notice: None,
    }
  }

  fn focused_input(&mut self) -> &mut TextInput {
    match self.focus {
      Field::Username => &mut self.username,
      Field::Password => &mut self.password,
    }
  }

  fn toggle_focus(&mut self) {
    self.focus = match self.focus {
      Field::Username => Field::Password,
      Field::Password => Field::Username,
    };
  }

  fn submit(&mut self) -> ViewAction {
    match self.ctx.login(self.username.value(), self.password.value()) {
      Ok(username) => {
        self.password.clear();
        self.notice = Some(Notice::success(format!("Welcome, {}", username)));
        ViewAction::Replace(Box::new(DashboardView::new(self.ctx.clone())))
      }
      Err(e) => {
        self.password.clear();
        self.error = Some(e.to_string());
        ViewAction::None
      }
    }
  }

  fn field_line(&self, label: &str, field: Field) -> Line<'static> {
    let input = match field {
      Field::Username => &self.username,
      Field::Password => &self.password,
    };
    let focused = self.focus == field;
    let mut value = input.display_value();
    if focused {
      value.push('_');
    }
    let label_style = if focused {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::DarkGray)
    };
    Line::from(vec![
      Span::styled(format!(" {:<10}", label), label_style),
      Span::raw(value),
    ])
  }
}

impl View for LoginView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.toggle_focus();
        return ViewAction::None;
      }
      KeyCode::Enter if self.focus == Field::Username => {
        self.focus = Field::Password;
        return ViewAction::None;
      }
      KeyCode::Enter => return self.submit(),
      KeyCode::Esc => return ViewAction::Quit,
      _ => {}
    }

    if let InputResult::Consumed = self.focused_input().handle_key(key) {
      self.error = None;
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let form_area = centered_rect(48, 9, area);
    let block = Block::default()
      .title(format!(" {} ", self.ctx.config.title()))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let mut lines = vec![
      Line::styled(" Sign in to continue", Style::default().fg(Color::White)),
      Line::raw(""),
      self.field_line("Username", Field::Username),
      self.field_line("Password", Field::Password),
      Line::raw(""),
    ];
    match &self.error {
      Some(error) => lines.push(Line::styled(
        format!(" {}", error),
        Style::default().fg(Color::Red),
      )),
      None => lines.push(Line::raw("")),
    }
    lines.push(Line::styled(
      " <tab> switch field  <enter> sign in  <esc> quit",
      Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines).block(block), form_area);
  }

  fn breadcrumb_label(&self) -> String {
    "Login".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("tab", "next field").with_priority(10),
      ShortcutInfo::new("enter", "sign in").with_priority(20),
      ShortcutInfo::new("esc", "quit").with_priority(30),
    ]
  }

  fn take_notice(&mut self) -> Option<Notice> {
    self.notice.take()
  }
}
