use crate::app::AppContext;
use crate::dataview::format::{format_inr, format_long_date};
use crate::directory::Employee;
use crate::ui::renderfns::department_color;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::PhotoCaptureView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// View for a single employee, or a "not found" page for unknown ids
pub struct EmployeeDetailView {
  ctx: AppContext,
  id: u64,
  employee: Option<Employee>,
}

impl EmployeeDetailView {
  pub fn new(ctx: AppContext, id: u64, records: &[Employee]) -> Self {
    let employee = records.iter().find(|e| e.id == id).cloned();
    Self { ctx, id, employee }
  }

  fn render_not_found(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Not found ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red));

    let text = vec![
      Line::from(""),
      Line::from(Span::styled(
        format!("No employee with id {}", self.id),
        Style::default().fg(Color::Red).bold(),
      )),
      Line::from(""),
      Line::from(Span::styled(
        "Press q or Esc to return to the list.",
        Style::default().fg(Color::DarkGray),
      )),
    ];
    frame.render_widget(
      Paragraph::new(text).block(block).alignment(Alignment::Center),
      area,
    );
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect, employee: &Employee) {
    let block = Block::default()
      .title(format!(" {} │ {} ", employee.code(), employee.name))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(9), // Fields
        Constraint::Length(1), // Separator
        Constraint::Min(3),    // Quick stats
      ])
      .split(inner);

    let label = |s: &'static str| Span::styled(format!("{:<14}", s), Style::default().fg(Color::DarkGray));
    let joined = employee
      .join_date
      .map(format_long_date)
      .unwrap_or_else(|| "N/A".to_string());

    let fields = vec![
      Line::from(vec![label("Employee ID"), Span::raw(employee.code())]),
      Line::from(vec![label("Name"), Span::styled(employee.name.clone(), Style::default().bold())]),
      Line::from(vec![label("Email"), Span::raw(employee.email.clone())]),
      Line::from(vec![
        label("Department"),
        Span::styled(
          employee.department.clone(),
          Style::default().fg(department_color(&employee.department)),
        ),
      ]),
      Line::from(vec![label("City"), Span::raw(employee.city.clone())]),
      Line::from(vec![
        label("Salary"),
        Span::styled(format_inr(employee.salary), Style::default().fg(Color::Green)),
        Span::styled(" / year", Style::default().fg(Color::DarkGray)),
      ]),
      Line::from(vec![
        label("Monthly"),
        Span::styled(format_inr(employee.salary / 12), Style::default().fg(Color::Green)),
      ]),
      Line::from(vec![label("Experience"), Span::raw(format!("{} years", employee.experience))]),
      Line::from(vec![label("Joined"), Span::raw(joined)]),
    ];
    frame.render_widget(Paragraph::new(fields), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    let stats = quick_stats(employee)
      .into_iter()
      .map(|(value, caption)| {
        Line::from(vec![
          Span::styled(format!("{:>8}", value), Style::default().fg(Color::Cyan).bold()),
          Span::raw("  "),
          Span::styled(caption, Style::default().fg(Color::DarkGray)),
        ])
      })
      .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(stats).wrap(Wrap { trim: false }), chunks[2]);
  }
}

/// Short tiles: experience, salary in thousands, department and city codes
fn quick_stats(employee: &Employee) -> Vec<(String, &'static str)> {
  vec![
    (format!("{}y", employee.experience), "Experience"),
    (format!("{}K", employee.salary / 1000), "Salary"),
    (abbreviate(&employee.department), "Department"),
    (abbreviate(&employee.city), "City"),
  ]
}

fn abbreviate(s: &str) -> String {
  let code: String = s.chars().take(3).collect::<String>().to_uppercase();
  if code.is_empty() {
    "-".to_string()
  } else {
    code
  }
}

impl View for EmployeeDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('p') => match &self.employee {
        Some(employee) => ViewAction::Push(Box::new(PhotoCaptureView::new(
          self.ctx.clone(),
          employee.name.clone(),
        ))),
        None => ViewAction::None,
      },
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    match &self.employee {
      Some(employee) => self.render_detail(frame, area, employee),
      None => self.render_not_found(frame, area),
    }
  }

  fn breadcrumb_label(&self) -> String {
    match &self.employee {
      Some(employee) => employee.code(),
      None => "Not found".to_string(),
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![ShortcutInfo::new("q", "back").with_priority(90)];
    if self.employee.is_some() {
      shortcuts.push(ShortcutInfo::new("p", "photo").with_priority(10));
    }
    shortcuts
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::app::tests::test_context;
  use crate::directory::synthetic::fallback_employees;
  use crossterm::event::KeyModifiers;
  use ratatui::backend::TestBackend;
  use ratatui::Terminal;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn screen(view: &mut EmployeeDetailView) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal.draw(|f| view.render(f, f.area())).unwrap();
    terminal
      .backend()
      .buffer()
      .content()
      .iter()
      .map(|c| c.symbol())
      .collect()
  }

  #[tokio::test]
  async fn test_unknown_id_shows_not_found() {
    let mut view = EmployeeDetailView::new(test_context(), 9999, &fallback_employees());
    assert_eq!(view.breadcrumb_label(), "Not found");
    assert!(screen(&mut view).contains("No employee with id 9999"));
    assert!(matches!(view.handle_key(key(KeyCode::Char('p'))), ViewAction::None));
    assert!(matches!(view.handle_key(key(KeyCode::Esc)), ViewAction::Pop));
  }

  #[tokio::test]
  async fn test_detail_shows_code_and_monthly_salary() {
    let records = fallback_employees();
    let first = records[0].clone();
    let mut view = EmployeeDetailView::new(test_context(), first.id, &records);
    assert_eq!(view.breadcrumb_label(), "EMP-00001");

    let text = screen(&mut view);
    assert!(text.contains("EMP-00001"));
    assert!(text.contains(&format_inr(first.salary / 12)));
  }

  #[tokio::test]
  async fn test_photo_key_pushes_capture() {
    let records = fallback_employees();
    let mut view = EmployeeDetailView::new(test_context(), 2, &records);
    assert!(matches!(view.handle_key(key(KeyCode::Char('p'))), ViewAction::Push(_)));
  }

  #[test]
  fn test_quick_stats() {
    let mut e = fallback_employees()[0].clone();
    e.department = "Engineering".into();
    e.city = "Pune".into();
    e.salary = 84_500;
    e.experience = 7;
    let stats = quick_stats(&e);
    assert_eq!(stats[0].0, "7y");
    assert_eq!(stats[1].0, "84K");
    assert_eq!(stats[2].0, "ENG");
    assert_eq!(stats[3].0, "PUN");
    assert_eq!(abbreviate(""), "-");
  }
}
