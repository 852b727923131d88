use crate::ui::components::Notice;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

fn breadcrumb_spans(trail: &[String]) -> Vec<Span<'_>> {
  let sep = Style::default().fg(Color::DarkGray);
  let last = trail.len().saturating_sub(1);

  let mut spans = vec![Span::raw(" ")];
  for (i, label) in trail.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", sep));
    }
    spans.push(if i == last {
      Span::styled(label.as_str(), Style::default().fg(Color::Cyan).bold())
    } else {
      Span::raw(label.as_str())
    });
  }
  spans
}

/// Bottom bar: `Dashboard > EMP-0042` on the left, the live notice on the right.
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], notice: Option<&Notice>) {
  frame.render_widget(Paragraph::new("").style(Style::default().bg(Color::Black)), area);

  let notice_width = notice.map_or(0, |n| n.message.chars().count() as u16 + 2);
  let [left, right] =
    Layout::horizontal([Constraint::Min(0), Constraint::Length(notice_width)]).areas(area);

  frame.render_widget(Paragraph::new(Line::from(breadcrumb_spans(breadcrumb))), left);

  if let Some(notice) = notice {
    let text = Span::styled(
      format!("{} ", notice.message),
      Style::default().fg(notice.level.color()),
    );
    frame.render_widget(Paragraph::new(Line::from(text).right_aligned()), right);
  }
}
