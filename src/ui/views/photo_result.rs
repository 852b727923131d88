use crate::app::AppContext;
use crate::export::save_file;
use crate::photo::{
  encode_jpeg, photo_file_name, share_file, Adjustment, PhotoError, PhotoSession, PhotoState,
  ShareOutcome,
};
use crate::query::Query;
use crate::ui::components::Notice;
use crate::ui::renderfns::draw_picture;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::PhotoCaptureView;
use chrono::Utc;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Review a captured photo: edit, download, share or retake.
pub struct PhotoResultView {
  ctx: AppContext,
  name: String,
  session: PhotoSession,
  /// Index into `Adjustment::ALL` while editing
  selected: usize,
  /// Encode and share command run off the UI thread
  sharing: Option<Query<ShareOutcome>>,
  notice: Option<Notice>,
}

impl PhotoResultView {
  pub fn new(ctx: AppContext, name: String, session: PhotoSession) -> Self {
    Self {
      ctx,
      name,
      session,
      selected: 0,
      sharing: None,
      notice: None,
    }
  }

  fn adjustment(&self) -> Adjustment {
    Adjustment::ALL[self.selected % Adjustment::ALL.len()]
  }

  fn report(&mut self, result: Result<(), PhotoError>) {
    if let Err(e) = result {
      self.notice = Some(Notice::warning(e.to_string()));
    }
  }

  fn encoded(&self) -> Result<(String, Vec<u8>)> {
    let image = self.session.current().ok_or(PhotoError::NothingCaptured)?;
    let bytes = encode_jpeg(image)?;
    let name = photo_file_name(&self.name, Utc::now().timestamp_millis());
    Ok((name, bytes))
  }

  fn download(&mut self) -> Result<PathBuf> {
    let (name, bytes) = self.encoded()?;
    let path = save_file(&self.ctx.exports_dir(), &name, &bytes)?;
    info!(path = %path.display(), "Photo downloaded");
    Ok(path)
  }

  fn start_share(&mut self) {
    if self.sharing.as_ref().is_some_and(|q| q.is_loading()) {
      return;
    }
    let Some(image) = self.session.current().cloned().map(Arc::new) else {
      self.notice = Some(Notice::warning(PhotoError::NothingCaptured.to_string()));
      return;
    };
    let command = self.ctx.config.exports.share_command.clone();
    let directory = self.ctx.exports_dir();
    let name = photo_file_name(&self.name, Utc::now().timestamp_millis());

    let mut query = Query::new(move || {
      let image = image.clone();
      let command = command.clone();
      let directory = directory.clone();
      let name = name.clone();
      async move {
        tokio::task::spawn_blocking(move || -> Result<ShareOutcome> {
          let bytes = encode_jpeg(&image)?;
          share_file(command.as_deref(), &directory, &name, &bytes)
        })
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
      }
    });
    query.fetch();
    self.sharing = Some(query);
    self.notice = Some(Notice::info("Sharing photo..."));
  }

  fn finish_share(&mut self) {
    let Some(query) = self.sharing.as_mut() else {
      return;
    };
    if !query.poll() {
      return;
    }
    self.notice = Some(match query.take() {
      Some(ShareOutcome::Shared(path)) => Notice::success(format!("Shared {}", path.display())),
      Some(ShareOutcome::Downloaded { path, reason }) => Notice::warning(format!(
        "Share unavailable ({}); saved to {}",
        reason,
        path.display()
      )),
      None => {
        let error = query.error().unwrap_or("unknown error");
        warn!(error, "Share failed");
        Notice::error(format!("Share failed: {}", error))
      }
    });
    self.sharing = None;
  }

  fn handle_editor_key(&mut self, key: KeyEvent) {
    let adjustment = self.adjustment();
    let result = match key.code {
      KeyCode::Up | KeyCode::Char('k') => {
        self.selected = (self.selected + Adjustment::ALL.len() - 1) % Adjustment::ALL.len();
        Ok(())
      }
      KeyCode::Down | KeyCode::Char('j') => {
        self.selected = (self.selected + 1) % Adjustment::ALL.len();
        Ok(())
      }
      KeyCode::Left | KeyCode::Char('h') => {
        self.session.params_mut().map(|p| p.nudge(adjustment, -1))
      }
      KeyCode::Right | KeyCode::Char('l') => {
        self.session.params_mut().map(|p| p.nudge(adjustment, 1))
      }
      KeyCode::Char('r') => self
        .session
        .params_mut()
        .map(|p| p.rotation = p.rotation.turned()),
      KeyCode::Char('R') => self.session.reset_params(),
      KeyCode::Enter => self.session.save_edit(),
      KeyCode::Esc => self.session.cancel_edit(),
      _ => Ok(()),
    };
    self.report(result);
  }

  fn render_editor(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Adjust ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
      ])
      .split(inner);

    let params = self.session.params();
    for (i, adjustment) in Adjustment::ALL.iter().enumerate() {
      let value = params.get(*adjustment);
      let selected = i == self.selected % Adjustment::ALL.len();
      let gauge = Gauge::default()
        .ratio(f64::from(value) / f64::from(crate::photo::edit::MAX_PERCENT))
        .label(format!("{} {}%", adjustment.label(), value))
        .gauge_style(Style::default().fg(if selected { Color::Cyan } else { Color::DarkGray }));
      frame.render_widget(gauge, rows[i]);
    }

    frame.render_widget(
      Paragraph::new(format!("Rotation {}°", params.rotation.degrees()))
        .style(Style::default().fg(Color::DarkGray)),
      rows[3],
    );
  }
}

impl View for PhotoResultView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.session.state() == PhotoState::Editing {
      self.handle_editor_key(key);
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('e') => {
        let result = self.session.begin_edit();
        self.selected = 0;
        self.report(result);
      }
      KeyCode::Char('v') => {
        let result = self.session.revert();
        if result.is_ok() {
          self.notice = Some(Notice::info("Reverted to the original photo"));
        }
        self.report(result);
      }
      KeyCode::Char('d') => {
        self.notice = Some(match self.download() {
          Ok(path) => Notice::success(format!("Photo saved to {}", path.display())),
          Err(e) => Notice::error(format!("Download failed: {}", e)),
        });
      }
      KeyCode::Char('s') => self.start_share(),
      KeyCode::Char('t') => match self.session.retake() {
        Ok(()) => {
          let session = std::mem::take(&mut self.session);
          return ViewAction::Replace(Box::new(PhotoCaptureView::resume(
            self.ctx.clone(),
            self.name.clone(),
            session,
          )));
        }
        Err(e) => self.notice = Some(Notice::warning(e.to_string())),
      },
      KeyCode::Enter => match self.session.confirm() {
        Ok(_) => {
          info!(name = %self.name, "Photo confirmed");
          self.notice = Some(Notice::success(format!("Photo confirmed for {}", self.name)));
          return ViewAction::Pop;
        }
        Err(e) => self.notice = Some(Notice::warning(e.to_string())),
      },
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let editing = self.session.state() == PhotoState::Editing;
    let chunks = Layout::default()
      .direction(Direction::Horizontal)
      .constraints(if editing {
        [Constraint::Min(10), Constraint::Length(32)]
      } else {
        [Constraint::Min(10), Constraint::Length(0)]
      })
      .split(area);

    let block = Block::default()
      .title(format!(" Photo: {} │ {} ", self.name, self.session.state()))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);

    if let Some(image) = self.session.preview() {
      draw_picture(frame, inner, image);
    }

    if editing {
      self.render_editor(frame, chunks[1]);
    }
  }

  fn breadcrumb_label(&self) -> String {
    "Photo".to_string()
  }

  fn tick(&mut self) {
    self.finish_share();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.session.state() == PhotoState::Editing {
      return vec![
        ShortcutInfo::new("↑/↓", "select").with_priority(10),
        ShortcutInfo::new("←/→", "adjust").with_priority(20),
        ShortcutInfo::new("r", "rotate").with_priority(30),
        ShortcutInfo::new("R", "reset").with_priority(40),
        ShortcutInfo::new("enter", "save").with_priority(50),
        ShortcutInfo::new("esc", "cancel").with_priority(60),
      ];
    }
    vec![
      ShortcutInfo::new("e", "edit").with_priority(10),
      ShortcutInfo::new("d", "download").with_priority(20),
      ShortcutInfo::new("s", "share").with_priority(30),
      ShortcutInfo::new("t", "retake").with_priority(40),
      ShortcutInfo::new("v", "revert").with_priority(50),
      ShortcutInfo::new("enter", "done").with_priority(60),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }

  fn take_notice(&mut self) -> Option<Notice> {
    self.notice.take()
  }
}
