use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const GAP: usize = 2;

fn hint_width(shortcut: &ShortcutInfo) -> usize {
  // "<key> label"
  shortcut.key.chars().count() + shortcut.label.chars().count() + 3
}

/// Shortcuts by priority (stable for ties), cut off at the first that
/// would overflow `budget` columns.
fn fitting_shortcuts(shortcuts: &[ShortcutInfo], budget: usize) -> Vec<&ShortcutInfo> {
  let mut ordered: Vec<&ShortcutInfo> = shortcuts.iter().collect();
  ordered.sort_by_key(|s| s.priority);

  let mut used = 0;
  ordered
    .into_iter()
    .take_while(|s| {
      let cost = hint_width(s) + if used == 0 { 0 } else { GAP };
      used += cost;
      used <= budget
    })
    .collect()
}

/// Top bar: app title, signed-in user, then as many key hints as fit.
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  username: Option<&str>,
  shortcuts: &[ShortcutInfo],
) {
  let divider = Span::styled("│", Style::default().fg(Color::DarkGray));
  let mut spans = vec![
    Span::styled(format!(" {title} "), Style::default().fg(Color::Cyan).bold()),
    divider.clone(),
  ];
  if let Some(user) = username {
    spans.push(Span::styled(
      format!(" {user} "),
      Style::default().fg(Color::Yellow).bold(),
    ));
    spans.push(divider);
  }
  spans.push(Span::raw(" "));

  let used: usize = spans.iter().map(|s| s.width()).sum();
  let budget = (area.width as usize).saturating_sub(used);

  for (i, shortcut) in fitting_shortcuts(shortcuts, budget).into_iter().enumerate() {
    if i > 0 {
      spans.push(Span::raw(" ".repeat(GAP)));
    }
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  frame.render_widget(
    Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
    area,
  );
}
