use crate::cache::CacheStorage;
use crate::config::Config;
use crate::directory::CachedDirectoryClient;
use crate::event::{Event, EventHandler};
use crate::photo::{Camera, FileCamera};
use crate::session::{AuthError, Session};
use crate::ui;
use crate::ui::components::Notice;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{DashboardView, LoginView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::info;

/// Shared services handed to every view.
///
/// The session lives behind a mutex so that login and logout are visible to
/// every view holding a clone.
#[derive(Clone)]
pub struct AppContext {
  pub config: Arc<Config>,
  pub directory: CachedDirectoryClient,
  pub camera: Arc<dyn Camera>,
  session: Arc<Mutex<Session>>,
}

impl AppContext {
  pub fn new(config: Config, storage: Arc<dyn CacheStorage>) -> Result<Self> {
    let directory = CachedDirectoryClient::new(&config, storage)?;
    let session = Session::restore(directory.cache().clone(), directory.envelope_key());
    let camera: Arc<dyn Camera> = Arc::new(FileCamera::new(&config.camera));

    Ok(Self {
      config: Arc::new(config),
      directory,
      camera,
      session: Arc::new(Mutex::new(session)),
    })
  }

  /// Swap the camera for a stub
  #[cfg(test)]
  pub fn with_camera(mut self, camera: Arc<dyn Camera>) -> Self {
    self.camera = camera;
    self
  }

  fn session(&self) -> MutexGuard<'_, Session> {
    self.session.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn username(&self) -> Option<String> {
    self.session().user().map(|u| u.username.clone())
  }

  pub fn is_logged_in(&self) -> bool {
    self.session().is_logged_in()
  }

  /// Check the pair against the configured login and start a session.
  pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
    let allowed = Config::login_credentials().ok();
    let mut session = self.session();
    let marker = session.login(username, password, allowed.as_ref())?;
    Ok(marker.username.clone())
  }

  pub fn logout(&self) {
    self.session().logout();
  }

  pub fn page_size(&self) -> usize {
    self.config.table.page_size
  }

  pub fn exports_dir(&self) -> PathBuf {
    self.config.exports.resolved_directory()
  }
}

/// Main application state
pub struct App {
  ctx: AppContext,

  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Footer message from the most recent view notice
  notice: Option<Notice>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, storage: Arc<dyn CacheStorage>) -> Result<Self> {
    let ctx = AppContext::new(config, storage)?;
    Ok(Self::with_context(ctx))
  }

  pub fn with_context(ctx: AppContext) -> Self {
    let root = Self::root_view(&ctx);
    Self {
      ctx,
      view_stack: vec![root],
      notice: None,
      should_quit: false,
    }
  }

  /// Dashboard when a session marker exists, login otherwise
  fn root_view(ctx: &AppContext) -> Box<dyn View> {
    if ctx.is_logged_in() {
      Box::new(DashboardView::new(ctx.clone()))
    } else {
      Box::new(LoginView::new(ctx.clone()))
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(100));

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    Ok(())
  }

  pub fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {
        if let Some(view) = self.view_stack.last_mut() {
          view.tick();
        }
      }
    }
    self.collect_notice();
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::Quit,
    };
    // A view being replaced or popped may still have something to say
    self.collect_notice();
    self.apply_action(action);
  }

  fn apply_action(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        // Dropping the view drops its pending queries
        self.view_stack.pop();
        if self.view_stack.is_empty() {
          self.should_quit = true;
        }
      }
      ViewAction::Replace(view) => {
        self.view_stack.pop();
        self.view_stack.push(view);
      }
      ViewAction::Logout => {
        self.ctx.logout();
        self.view_stack.clear();
        self.view_stack.push(Box::new(LoginView::new(self.ctx.clone())));
        self.notice = Some(Notice::info("Logged out"));
        info!("Session ended, returned to login");
      }
      ViewAction::Quit => self.should_quit = true,
    }
  }

  fn collect_notice(&mut self) {
    if let Some(notice) = self.view_stack.last_mut().and_then(|v| v.take_notice()) {
      self.notice = Some(notice);
    } else if self.notice.as_ref().is_some_and(|n| n.is_expired()) {
      self.notice = None;
    }
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn title(&self) -> &str {
    self.ctx.config.title()
  }

  pub fn username(&self) -> Option<String> {
    self.ctx.username()
  }

  pub fn notice(&self) -> Option<&Notice> {
    self.notice.as_ref()
  }

  pub fn should_quit(&self) -> bool {
    self.should_quit
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}
