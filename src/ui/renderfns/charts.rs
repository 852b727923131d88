use crate::dataview::format::{format_inr, format_inr_f64, group_indian};
use crate::dataview::projections::{chart_bars, Analytics, CityClusters, SALARY_BRACKETS};
use crate::directory::Employee;
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Map, MapResolution};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};

// Longitude/latitude window around the subcontinent
const MAP_X_BOUNDS: [f64; 2] = [66.0, 92.0];
const MAP_Y_BOUNDS: [f64; 2] = [6.0, 36.0];

fn panel(title: &str) -> Block<'static> {
  Block::default()
    .title(format!(" {} ", title))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue))
}

fn empty(frame: &mut Frame, area: Rect, title: &str, message: &str) {
  let paragraph = Paragraph::new(message)
    .block(panel(title))
    .style(Style::default().fg(Color::DarkGray));
  frame.render_widget(paragraph, area);
}

/// Horizontal salary bars for the first records in display order
pub fn draw_salary_chart(frame: &mut Frame, area: Rect, records: &[Employee]) {
  let data = chart_bars(records);
  if data.is_empty() {
    empty(frame, area, "Salaries", "No employees to chart.");
    return;
  }

  let bars: Vec<Bar> = data
    .iter()
    .map(|(label, salary)| {
      Bar::default()
        .value(*salary)
        .label(Line::from(label.clone()))
        .text_value(format_inr(*salary))
        .style(Style::default().fg(Color::Magenta))
    })
    .collect();

  let chart = BarChart::default()
    .block(panel(&format!("Salaries (top {})", data.len())))
    .direction(Direction::Horizontal)
    .bar_width(1)
    .bar_gap(1)
    .value_style(Style::default().fg(Color::White).bold())
    .data(BarGroup::default().bars(&bars));
  frame.render_widget(chart, area);
}

/// City pins over a world map, with a side list of counts
pub fn draw_city_map(frame: &mut Frame, area: Rect, clusters: &CityClusters) {
  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(30), Constraint::Length(28)])
    .split(area);

  let canvas = Canvas::default()
    .block(panel("Employees by city"))
    .marker(Marker::Braille)
    .x_bounds(MAP_X_BOUNDS)
    .y_bounds(MAP_Y_BOUNDS)
    .paint(|ctx| {
      ctx.draw(&Map {
        resolution: MapResolution::High,
        color: Color::DarkGray,
      });
      ctx.layer();
      for pin in &clusters.pins {
        ctx.print(
          pin.lon,
          pin.lat,
          Line::styled(
            format!("● {} ({})", pin.city, pin.count),
            Style::default().fg(Color::Yellow),
          ),
        );
      }
    });
  frame.render_widget(canvas, chunks[0]);

  let mut lines: Vec<Line> = clusters
    .pins
    .iter()
    .map(|pin| {
      Line::from(vec![
        Span::styled(format!(" {:<12}", pin.city), Style::default().fg(Color::Cyan)),
        Span::raw(format!("{:>5}", pin.count)),
      ])
    })
    .collect();
  if clusters.pins.is_empty() {
    lines.push(Line::styled(
      " No mappable cities.",
      Style::default().fg(Color::DarkGray),
    ));
  }
  if !clusters.unplaced.is_empty() {
    lines.push(Line::raw(""));
    lines.push(Line::styled(
      format!(
        " {} employees in {} unmapped cities",
        clusters.unplaced_records(),
        clusters.unplaced.len()
      ),
      Style::default().fg(Color::Yellow),
    ));
  }
  frame.render_widget(Paragraph::new(lines).block(panel("Cities")), chunks[1]);
}

fn vertical_bars<'a>(title: &'a str, data: &'a [(String, usize)], color: Color) -> BarChart<'a> {
  let bars: Vec<Bar> = data
    .iter()
    .map(|(label, count)| {
      Bar::default()
        .value(*count as u64)
        .label(Line::from(truncate(label, 8)))
        .style(Style::default().fg(color))
    })
    .collect();

  BarChart::default()
    .block(panel(title))
    .bar_width(8)
    .bar_gap(1)
    .value_style(Style::default().fg(Color::Black).bg(color))
    .data(BarGroup::default().bars(&bars))
}

/// Department, salary and experience breakdowns over the full record set
pub fn draw_analytics(frame: &mut Frame, area: Rect, stats: &Analytics) {
  if stats.total == 0 {
    empty(frame, area, "Analytics", "No employees loaded.");
    return;
  }

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(4), Constraint::Min(8), Constraint::Min(8)])
    .split(area);

  let summary = vec![
    Line::from(vec![
      Span::styled(" Employees ", Style::default().fg(Color::DarkGray)),
      Span::styled(stats.total.to_string(), Style::default().bold()),
      Span::styled("   Mean salary ", Style::default().fg(Color::DarkGray)),
      Span::styled(format_inr_f64(stats.mean_salary), Style::default().bold()),
    ]),
    Line::from(vec![
      Span::styled(" Departments ", Style::default().fg(Color::DarkGray)),
      Span::styled(stats.department_count().to_string(), Style::default().bold()),
      Span::styled("   Mean experience ", Style::default().fg(Color::DarkGray)),
      Span::styled(
        format!("{:.1}y", stats.mean_experience),
        Style::default().bold(),
      ),
    ]),
  ];
  frame.render_widget(Paragraph::new(summary).block(panel("Overview")), rows[0]);

  frame.render_widget(
    vertical_bars("Departments", &stats.departments, Color::Cyan),
    rows[1],
  );

  let bottom = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(rows[2]);

  let salary: Vec<(String, usize)> = SALARY_BRACKETS
    .iter()
    .zip(stats.salary_brackets.iter())
    .map(|(label, count)| (label.to_string(), *count))
    .collect();
  frame.render_widget(
    vertical_bars("Salary ranges (INR)", &salary, Color::Green),
    bottom[0],
  );
  frame.render_widget(
    vertical_bars("Experience", &stats.experience_brackets, Color::Magenta),
    bottom[1],
  );
}

/// One-line summary above every dashboard mode
pub fn summary_line(stats: &Analytics) -> Line<'static> {
  Line::from(vec![
    Span::styled(" Total ", Style::default().fg(Color::DarkGray)),
    Span::styled(group_indian(stats.total as u64), Style::default().bold()),
    Span::styled("  │  Avg salary ", Style::default().fg(Color::DarkGray)),
    Span::styled(format_inr_f64(stats.mean_salary), Style::default().bold()),
    Span::styled("  │  Departments ", Style::default().fg(Color::DarkGray)),
    Span::styled(stats.department_count().to_string(), Style::default().bold()),
  ])
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataview::projections::city_clusters;
  use crate::directory::synthetic::fallback_employees;
  use ratatui::backend::TestBackend;

  fn render(f: impl FnOnce(&mut Frame)) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(f).unwrap();
    let buffer = terminal.backend().buffer().clone();
    buffer.content().iter().map(|c| c.symbol()).collect()
  }

  #[test]
  fn test_summary_line() {
    let stats = Analytics::compute(&fallback_employees());
    let text: String = summary_line(&stats)
      .spans
      .iter()
      .map(|s| s.content.as_ref())
      .collect();
    assert!(text.contains("Total 50"));
    assert!(text.contains("Departments"));
  }

  #[test]
  fn test_map_lists_cities() {
    let clusters = city_clusters(&fallback_employees());
    let screen = render(|frame| draw_city_map(frame, frame.area(), &clusters));
    assert!(screen.contains(&clusters.pins[0].city));
  }

  #[test]
  fn test_empty_views_render_messages() {
    let screen = render(|frame| draw_salary_chart(frame, frame.area(), &[]));
    assert!(screen.contains("No employees to chart."));
    let screen = render(|frame| draw_analytics(frame, frame.area(), &Analytics::default()));
    assert!(screen.contains("No employees loaded."));
  }
}
