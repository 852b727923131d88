use crate::app::AppContext;
use crate::cache::{CacheResult, CacheSource};
use crate::commands::{parse_command, CommandAction};
use crate::dataview::format::format_inr;
use crate::dataview::pagination::total_pages;
use crate::dataview::projections::{city_clusters, Analytics};
use crate::dataview::{apply, paginate, SortField, ViewCriteria};
use crate::directory::Employee;
use crate::export::{export_records, ExportFormat};
use crate::query::{Query, QueryState};
use crate::ui::components::{
  CommandEvent, CommandInput, FilterForm, FilterFormEvent, KeyResult, Notice, SearchEvent,
  SearchInput,
};
use crate::ui::ensure_valid_table_selection;
use crate::ui::renderfns::charts::{draw_analytics, draw_city_map, draw_salary_chart, summary_line};
use crate::ui::renderfns::{department_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{CompareView, EmployeeDetailView};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs};
use tracing::{info, warn};

/// What the main area shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardMode {
  Table,
  Chart,
  Map,
  Analytics,
}

impl DashboardMode {
  const ALL: [DashboardMode; 4] = [
    DashboardMode::Table,
    DashboardMode::Chart,
    DashboardMode::Map,
    DashboardMode::Analytics,
  ];

  fn label(&self) -> &'static str {
    match self {
      DashboardMode::Table => "Table",
      DashboardMode::Chart => "Chart",
      DashboardMode::Map => "Map",
      DashboardMode::Analytics => "Analytics",
    }
  }

  fn index(&self) -> usize {
    Self::ALL.iter().position(|m| m == self).unwrap_or(0)
  }

  fn next(&self) -> Self {
    Self::ALL[(self.index() + 1) % Self::ALL.len()]
  }
}

/// Table columns in sort-key order (`1` sorts by the first)
const COLUMNS: [(SortField, &str, Constraint); 8] = [
  (SortField::Id, "ID", Constraint::Length(5)),
  (SortField::Name, "Name", Constraint::Min(16)),
  (SortField::Email, "Email", Constraint::Min(20)),
  (SortField::Department, "Department", Constraint::Length(12)),
  (SortField::City, "City", Constraint::Length(10)),
  (SortField::Salary, "Salary", Constraint::Length(10)),
  (SortField::Experience, "Exp", Constraint::Length(5)),
  (SortField::JoinDate, "Joined", Constraint::Length(10)),
];

type LoadResult = CacheResult<Vec<Employee>>;

/// Root view after login: the employee list and its projections
pub struct DashboardView {
  ctx: AppContext,

  // Data
  query: Query<LoadResult>,
  records: Vec<Employee>,
  source: Option<CacheSource>,
  fetched_at: Option<chrono::DateTime<Utc>>,
  stats: Analytics,

  // Derived
  criteria: ViewCriteria,
  displayed: Vec<Employee>,

  // UI state
  mode: DashboardMode,
  page: usize,
  table_state: TableState,

  // Components
  search: SearchInput,
  command: CommandInput,
  filter_form: FilterForm,
  notice: Option<Notice>,
}

impl DashboardView {
  pub fn new(ctx: AppContext) -> Self {
    let mut query = Self::load_query(&ctx, false);
    // Start fetching immediately
    query.fetch();

    Self {
      ctx,
      query,
      records: Vec::new(),
      source: None,
      fetched_at: None,
      stats: Analytics::default(),
      criteria: ViewCriteria::default(),
      displayed: Vec::new(),
      mode: DashboardMode::Table,
      page: 1,
      table_state: TableState::default(),
      search: SearchInput::new(),
      command: CommandInput::new(),
      filter_form: FilterForm::new(),
      notice: None,
    }
  }

  /// `refresh` bypasses the freshness window
  fn load_query(ctx: &AppContext, refresh: bool) -> Query<LoadResult> {
    let directory = ctx.directory.clone();
    Query::new(move || {
      let directory = directory.clone();
      async move {
        let result = if refresh {
          directory.refresh_employees().await
        } else {
          directory.load_employees().await
        };
        Ok::<_, String>(result)
      }
    })
  }

  fn refresh(&mut self) {
    // Replacing the query drops the receiver of any fetch still in flight
    self.query = Self::load_query(&self.ctx, true);
    self.query.fetch();
    self.notice = Some(Notice::info("Refreshing employees..."));
  }

  /// Install a freshly loaded record set, replacing the old one wholesale.
  fn apply_load(&mut self, result: LoadResult) {
    if result.is_fallback() {
      warn!(count = result.data.len(), "Showing placeholder employees");
    }
    self.notice = match &result.source {
      CacheSource::Fallback { reason } => Some(Notice::warning(format!(
        "Employee service unavailable ({}); showing placeholder data",
        truncate(reason, 60)
      ))),
      CacheSource::Network => Some(Notice::success(format!(
        "Loaded {} employees",
        result.data.len()
      ))),
      CacheSource::CacheFresh => None,
    };
    self.records = result.data;
    self.source = Some(result.source);
    self.fetched_at = result.fetched_at;
    self.stats = Analytics::compute(&self.records);
    self.recompute();
  }

  /// Re-derive the displayed set; any change resets to the first page.
  fn recompute(&mut self) {
    self.displayed = apply(&self.records, &self.criteria);
    self.page = 1;
    self.table_state.select(Some(0));
  }

  fn total_pages(&self) -> usize {
    total_pages(self.displayed.len(), self.ctx.page_size())
  }

  fn change_page(&mut self, delta: isize) {
    let last = self.total_pages();
    let next = (self.page as isize + delta).clamp(1, last as isize) as usize;
    if next != self.page {
      self.page = next;
      self.table_state.select(Some(0));
    }
  }

  fn selected_employee(&self) -> Option<&Employee> {
    let page = paginate(&self.displayed, self.ctx.page_size(), self.page);
    self
      .table_state
      .selected()
      .and_then(|i| page.items.get(i))
  }

  fn move_selection(&mut self, delta: isize) {
    let len = paginate(&self.displayed, self.ctx.page_size(), self.page)
      .items
      .len();
    if len == 0 {
      return;
    }
    let current = self.table_state.selected().unwrap_or(0) as isize;
    let next = current + delta;
    if next < 0 && self.page > 1 {
      self.change_page(-1);
      let len = paginate(&self.displayed, self.ctx.page_size(), self.page)
        .items
        .len();
      self.table_state.select(Some(len.saturating_sub(1)));
    } else if next >= len as isize && self.page < self.total_pages() {
      self.change_page(1);
    } else {
      self
        .table_state
        .select(Some(next.clamp(0, len as isize - 1) as usize));
    }
  }

  fn toggle_sort(&mut self, field: SortField) {
    self.criteria.toggle_sort(field);
    self.recompute();
  }

  fn export(&mut self, format: ExportFormat) {
    let dir = self.ctx.exports_dir();
    self.notice = Some(match export_records(&self.displayed, format, &dir) {
      Ok(path) => Notice::success(format!("{} saved to {}", format.label(), path.display())),
      Err(e) => Notice::error(format!("{} export failed: {}", format.label(), e)),
    });
  }

  fn open_detail(&self, id: u64) -> ViewAction {
    ViewAction::Push(Box::new(EmployeeDetailView::new(
      self.ctx.clone(),
      id,
      &self.records,
    )))
  }

  fn run_command(&mut self, line: &str) -> ViewAction {
    let action = match parse_command(line) {
      Ok(action) => action,
      Err(e) => {
        self.notice = Some(Notice::error(e.to_string()));
        return ViewAction::None;
      }
    };
    info!(?action, "Command");

    match action {
      CommandAction::Table => self.mode = DashboardMode::Table,
      CommandAction::Chart => self.mode = DashboardMode::Chart,
      CommandAction::Map => self.mode = DashboardMode::Map,
      CommandAction::Analytics => self.mode = DashboardMode::Analytics,
      CommandAction::Compare => return self.open_compare(),
      CommandAction::Filter => self.filter_form.open(&self.criteria.filters, &self.records),
      CommandAction::ExportCsv => self.export(ExportFormat::Csv),
      CommandAction::ExportPdf => self.export(ExportFormat::Pdf),
      CommandAction::Refresh => self.refresh(),
      CommandAction::Employee(id) => return self.open_detail(id),
      CommandAction::Logout => return ViewAction::Logout,
      CommandAction::Quit => return ViewAction::Quit,
    }
    ViewAction::None
  }

  fn open_compare(&mut self) -> ViewAction {
    if self.records.len() < 2 {
      self.notice = Some(Notice::warning("Need at least two employees to compare"));
      return ViewAction::None;
    }
    ViewAction::Push(Box::new(CompareView::new(self.records.clone())))
  }

  /// Overlays are modal: when one is open it gets every key
  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.filter_form.handle_key(key) {
      KeyResult::Event(FilterFormEvent::Applied(filters)) => {
        let active = filters.active_count();
        self.criteria.filters = filters;
        self.recompute();
        self.notice = Some(Notice::info(if active == 0 {
          "Filters cleared".to_string()
        } else {
          format!("{} filters active, {} matches", active, self.displayed.len())
        }));
        return Some(ViewAction::None);
      }
      KeyResult::Event(FilterFormEvent::Cancelled) | KeyResult::Handled => {
        return Some(ViewAction::None)
      }
      KeyResult::NotHandled => {}
    }

    match self.command.handle_key(key) {
      KeyResult::Event(CommandEvent::Submitted(line)) => return Some(self.run_command(&line)),
      KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => {
        return Some(ViewAction::None)
      }
      KeyResult::NotHandled => {}
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(query)) => {
        self.criteria.query = query;
        self.recompute();
        Some(ViewAction::None)
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
      KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => self.change_page(1),
      KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => self.change_page(-1),
      KeyCode::Tab => self.mode = self.mode.next(),
      _ => return None,
    }
    Some(ViewAction::None)
  }

  fn handle_actions(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char(c @ '1'..='8') => {
        let idx = c as usize - '1' as usize;
        self.toggle_sort(COLUMNS[idx].0);
      }
      KeyCode::Char('0') => {
        self.criteria.clear_sort();
        self.recompute();
      }
      KeyCode::Char('f') => self.filter_form.open(&self.criteria.filters, &self.records),
      KeyCode::Char('r') => self.refresh(),
      KeyCode::Char('x') => self.export(ExportFormat::Csv),
      KeyCode::Char('p') => self.export(ExportFormat::Pdf),
      KeyCode::Char('c') => return self.open_compare(),
      KeyCode::Enter => {
        if let Some(id) = self.selected_employee().map(|e| e.id) {
          return self.open_detail(id);
        }
      }
      KeyCode::Esc if !self.criteria.query.is_empty() => {
        self.search.clear();
        self.criteria.query.clear();
        self.recompute();
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn status_text(&self) -> String {
    match (&self.source, self.fetched_at) {
      (Some(CacheSource::Fallback { .. }), _) => "placeholder data".to_string(),
      (Some(CacheSource::CacheFresh), Some(at)) => {
        let mins = (Utc::now() - at).num_minutes();
        format!("cached {}m ago", mins.max(0))
      }
      (Some(CacheSource::Network), _) => "live".to_string(),
      _ => String::new(),
    }
  }

  fn render_toolbar(&self, frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Length(1)])
      .split(area);

    let mut summary = summary_line(&self.stats);
    let status = self.status_text();
    if !status.is_empty() {
      let color = if matches!(self.source, Some(CacheSource::Fallback { .. })) {
        Color::Yellow
      } else {
        Color::DarkGray
      };
      summary
        .spans
        .push(Span::styled(format!("  │  {}", status), Style::default().fg(color)));
    }
    frame.render_widget(Paragraph::new(summary), rows[0]);

    let tabs_area = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Length(40), Constraint::Min(0)])
      .split(rows[1]);

    let tabs = Tabs::new(DashboardMode::ALL.iter().map(|m| m.label()))
      .select(self.mode.index())
      .style(Style::default().fg(Color::DarkGray))
      .highlight_style(Style::default().fg(Color::Cyan).bold());
    frame.render_widget(tabs, tabs_area[0]);

    let mut badges = Vec::new();
    if !self.criteria.query.is_empty() {
      badges.push(Span::styled(
        format!("/{}", self.criteria.query),
        Style::default().fg(Color::Yellow),
      ));
    }
    let active = self.criteria.filters.active_count();
    if active > 0 {
      badges.push(Span::styled(
        format!("  Filters ({})", active),
        Style::default().fg(Color::Yellow),
      ));
    }
    if let Some(sort) = self.criteria.sort {
      badges.push(Span::styled(
        format!("  sort: {} {}", sort.field.label(), sort.direction.arrow()),
        Style::default().fg(Color::DarkGray),
      ));
    }
    frame.render_widget(
      Paragraph::new(Line::from(badges)).alignment(Alignment::Right),
      tabs_area[1],
    );
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect) {
    let page_size = self.ctx.page_size();
    let page = paginate(&self.displayed, page_size, self.page);
    let len = page.items.len();
    ensure_valid_table_selection(&mut self.table_state, len);

    let title = match self.query.state() {
      QueryState::Loading => format!(
        " Employees (loading {}s) ",
        self.query.loading_secs().unwrap_or(0)
      ),
      _ => format!(
        " Employees ({}) │ {} │ {}page {}/{}{} ",
        self.displayed.len(),
        page.summary(),
        if page.has_previous() { "◀ " } else { "" },
        page.number,
        page.total_pages,
        if page.has_next() { " ▶" } else { "" },
      ),
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.displayed.is_empty() {
      let content = if self.query.is_loading() {
        "Loading employees..."
      } else if self.records.is_empty() {
        "No employees loaded. Press 'r' to retry."
      } else {
        "No employees match the current search and filters."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let header = Row::new(COLUMNS.iter().enumerate().map(|(i, (field, name, _))| {
      let arrow = match self.criteria.sort {
        Some(sort) if sort.field == *field => sort.direction.arrow(),
        _ => "",
      };
      Cell::from(format!("{}{} {}", i + 1, name, arrow))
    }))
    .style(Style::default().fg(Color::Yellow).bold());

    let rows: Vec<Row> = page
      .items
      .iter()
      .map(|e| {
        Row::new(vec![
          Cell::from(e.id.to_string()).style(Style::default().fg(Color::DarkGray)),
          Cell::from(e.name.clone()),
          Cell::from(e.email.clone()).style(Style::default().fg(Color::DarkGray)),
          Cell::from(e.department.clone()).style(Style::default().fg(department_color(&e.department))),
          Cell::from(e.city.clone()),
          Cell::from(format_inr(e.salary)).style(Style::default().fg(Color::Green)),
          Cell::from(format!("{}y", e.experience)),
          Cell::from(e.join_date_iso()),
        ])
      })
      .collect();

    let widths: Vec<Constraint> = COLUMNS.iter().map(|(_, _, w)| *w).collect();
    let table = Table::new(rows, widths)
      .header(header)
      .block(block)
      .row_highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut self.table_state);
  }
}

impl View for DashboardView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if let Some(action) = self.handle_overlays(key) {
      return action;
    }
    if let Some(action) = self.handle_navigation(key) {
      return action;
    }
    self.handle_actions(key)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(2), Constraint::Min(0)])
      .split(area);

    self.render_toolbar(frame, chunks[0]);

    match self.mode {
      DashboardMode::Table => self.render_table(frame, chunks[1]),
      DashboardMode::Chart => draw_salary_chart(frame, chunks[1], &self.displayed),
      DashboardMode::Map => draw_city_map(frame, chunks[1], &city_clusters(&self.displayed)),
      DashboardMode::Analytics => draw_analytics(frame, chunks[1], &self.stats),
    }

    // Overlays last so they sit on top
    self.search.render_overlay(frame, chunks[1], self.displayed.len());
    self.command.render_overlay(frame, chunks[1]);
    self.filter_form.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    if self.mode == DashboardMode::Table {
      "Employees".to_string()
    } else {
      format!("Employees [{}]", self.mode.label())
    }
  }

  fn tick(&mut self) {
    if self.query.poll() {
      if let Some(result) = self.query.take() {
        self.apply_load(result);
      } else if let Some(error) = self.query.error() {
        self.notice = Some(Notice::error(format!("Failed to load employees: {}", error)));
      }
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("f", "filters").with_priority(30),
      ShortcutInfo::new("tab", "view").with_priority(40),
      ShortcutInfo::new("r", "refresh").with_priority(60),
      ShortcutInfo::new("x/p", "csv/pdf").with_priority(70),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ];
    if self.mode == DashboardMode::Table {
      shortcuts.push(ShortcutInfo::new("1-8", "sort").with_priority(50));
      shortcuts.push(ShortcutInfo::new("h/l", "page").with_priority(55));
      shortcuts.push(ShortcutInfo::new("enter", "details").with_priority(56));
    }
    if !self.criteria.query.is_empty() {
      shortcuts.push(ShortcutInfo::new("esc", "clear search").with_priority(25));
    }
    shortcuts
  }

  fn take_notice(&mut self) -> Option<Notice> {
    self.notice.take()
  }
}
