use crate::app::AppContext;
use crate::photo::{PhotoSession, PhotoState};
use crate::query::Query;
use crate::ui::centered_rect;
use crate::ui::components::Notice;
use crate::ui::renderfns::draw_picture;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::PhotoResultView;
use crossterm::event::{KeyCode, KeyEvent};
use image::RgbaImage;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tracing::{info, warn};

/// Take a photo for one employee.
///
/// Owns the [`PhotoSession`] until the capture is confirmed, then hands it to
/// [`PhotoResultView`].
pub struct PhotoCaptureView {
  ctx: AppContext,
  name: String,
  session: PhotoSession,
  /// Pending frame, tagged with the session's request ticket
  capture: Option<Query<(u64, RgbaImage)>>,
  /// Device failure; blocks every other key until dismissed
  failure: Option<String>,
  notice: Option<Notice>,
}

impl PhotoCaptureView {
  pub fn new(ctx: AppContext, name: String) -> Self {
    Self {
      ctx,
      name,
      session: PhotoSession::new(),
      capture: None,
      failure: None,
      notice: None,
    }
  }

  /// Continue a session that was sent back for a retake.
  pub fn resume(ctx: AppContext, name: String, session: PhotoSession) -> Self {
    let mut view = Self {
      ctx,
      name,
      session,
      capture: None,
      failure: None,
      notice: None,
    };
    if view.session.state() == PhotoState::Capturing {
      view.request_frame();
    }
    view
  }

  fn start_capture(&mut self) {
    match self.session.start_capture() {
      Ok(()) => self.request_frame(),
      Err(e) => self.notice = Some(Notice::warning(e.to_string())),
    }
  }

  fn request_frame(&mut self) {
    let camera = self.ctx.camera.clone();
    let facing = self.session.facing();
    let request = self.session.frame_request();
    info!(facing = facing.label(), request, "Capturing photo");

    let mut query = Query::new(move || {
      let camera = camera.clone();
      async move {
        tokio::task::spawn_blocking(move || camera.capture(facing))
          .await
          .map_err(|e| e.to_string())?
          .map(|frame| (request, frame))
          .map_err(|e| e.to_string())
      }
    });
    query.fetch();
    // Replacing the query drops any frame still coming from the old request
    self.capture = Some(query);
  }

  fn toggle_facing(&mut self) {
    self.notice = Some(match self.session.toggle_facing() {
      Ok(facing) => {
        if self.session.state() == PhotoState::Capturing {
          self.request_frame();
        }
        Notice::info(format!("Using {} camera", facing.label()))
      }
      Err(e) => Notice::warning(e.to_string()),
    });
  }

  fn retake(&mut self) {
    match self.session.retake() {
      Ok(()) => self.request_frame(),
      Err(e) => self.notice = Some(Notice::warning(e.to_string())),
    }
  }

  fn confirm(&mut self) -> ViewAction {
    if self.session.state() != PhotoState::Captured {
      return ViewAction::None;
    }
    let session = std::mem::take(&mut self.session);
    ViewAction::Replace(Box::new(PhotoResultView::new(
      self.ctx.clone(),
      self.name.clone(),
      session,
    )))
  }

  fn render_failure(&self, frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(60, 9, area);
    frame.render_widget(Clear, popup);

    let text = vec![
      Line::from(Span::styled("Camera unavailable", Style::default().fg(Color::Red).bold())),
      Line::from(""),
      Line::from(message.to_string()),
      Line::from(""),
      Line::from(Span::styled(
        "Press Enter or Esc to dismiss",
        Style::default().fg(Color::DarkGray),
      )),
    ];
    let paragraph = Paragraph::new(text)
      .wrap(Wrap { trim: true })
      .alignment(Alignment::Center)
      .block(
        Block::default()
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Red)),
      );
    frame.render_widget(paragraph, popup);
  }
}

impl View for PhotoCaptureView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.failure.is_some() {
      if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
        self.failure = None;
      }
      return ViewAction::None;
    }

    match (self.session.state(), key.code) {
      (_, KeyCode::Char('f')) => self.toggle_facing(),
      (PhotoState::Idle, KeyCode::Char(' ')) => self.start_capture(),
      (PhotoState::Captured, KeyCode::Enter) => return self.confirm(),
      (PhotoState::Captured, KeyCode::Char('r')) => self.retake(),
      (_, KeyCode::Char('q') | KeyCode::Esc) => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(
        " Photo: {} │ {} camera │ {} ",
        self.name,
        self.session.facing().label(),
        self.session.state()
      ))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let state = self.session.state();
    match self.session.preview() {
      Some(image) => draw_picture(frame, inner, image),
      None => {
        let hint = match state {
          PhotoState::Capturing => "Capturing...",
          _ => "Press space to take a photo, f to switch camera",
        };
        frame.render_widget(
          Paragraph::new(hint)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
          inner,
        );
      }
    }

    if let Some(message) = &self.failure {
      self.render_failure(frame, area, message);
    }
  }

  fn breadcrumb_label(&self) -> String {
    "Photo".to_string()
  }

  fn tick(&mut self) {
    let Some(query) = self.capture.as_mut() else {
      return;
    };
    if !query.poll() {
      return;
    }

    if let Some((request, frame)) = query.take() {
      if let Err(e) = self.session.capture_succeeded(request, frame) {
        warn!(error = %e, "Discarding late frame");
      }
    } else {
      let error = query.error().unwrap_or("capture failed").to_string();
      warn!(error = %error, "Capture failed");
      self.session.capture_failed();
      self.failure = Some(error);
    }
    self.capture = None;
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![ShortcutInfo::new("q", "back").with_priority(90)];
    match self.session.state() {
      PhotoState::Idle => {
        shortcuts.push(ShortcutInfo::new("space", "capture").with_priority(10));
        shortcuts.push(ShortcutInfo::new("f", "flip camera").with_priority(20));
      }
      PhotoState::Captured => {
        shortcuts.push(ShortcutInfo::new("enter", "use photo").with_priority(10));
        shortcuts.push(ShortcutInfo::new("r", "retake").with_priority(20));
      }
      _ => {}
    }
    shortcuts
  }

  fn take_notice(&mut self) -> Option<Notice> {
    self.notice.take()
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::app::tests::test_context;
  use crate::photo::camera::Facing;
  use crate::photo::{Camera, PhotoError};
  use crossterm::event::KeyModifiers;
  use image::Rgba;
  use std::sync::Arc;
  use std::time::Duration;

  pub(crate) struct SolidCamera;

  impl Camera for SolidCamera {
    fn capture(&self, facing: Facing) -> Result<RgbaImage, PhotoError> {
      let shade = match facing {
        Facing::Front => 200,
        Facing::Back => 50,
      };
      Ok(RgbaImage::from_pixel(4, 4, Rgba([shade, shade, shade, 255])))
    }
  }

  struct BrokenCamera;

  impl Camera for BrokenCamera {
    fn capture(&self, _facing: Facing) -> Result<RgbaImage, PhotoError> {
      Err(PhotoError::Camera("permission denied".into()))
    }
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  async fn settle(view: &mut PhotoCaptureView) {
    for _ in 0..100 {
      view.tick();
      if view.capture.is_none() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("capture never completed");
  }

  fn view_with(camera: Arc<dyn Camera>) -> PhotoCaptureView {
    PhotoCaptureView::new(test_context().with_camera(camera), "Asha 1".into())
  }

  #[tokio::test]
  async fn test_capture_then_confirm() {
    let mut view = view_with(Arc::new(SolidCamera));
    view.handle_key(key(KeyCode::Char(' ')));
    assert_eq!(view.session.state(), PhotoState::Capturing);

    settle(&mut view).await;
    assert_eq!(view.session.state(), PhotoState::Captured);
    assert!(matches!(view.handle_key(key(KeyCode::Enter)), ViewAction::Replace(_)));
  }

  #[tokio::test]
  async fn test_failure_blocks_until_dismissed() {
    let mut view = view_with(Arc::new(BrokenCamera));
    view.handle_key(key(KeyCode::Char(' ')));
    settle(&mut view).await;

    assert_eq!(view.session.state(), PhotoState::Idle);
    assert!(view.failure.as_deref().unwrap().contains("permission denied"));

    // Modal swallows keys
    assert!(matches!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::None));
    view.handle_key(key(KeyCode::Enter));
    assert!(view.failure.is_none());
    assert!(matches!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::Pop));
  }

  #[tokio::test]
  async fn test_facing_locked_after_capture() {
    let mut view = view_with(Arc::new(SolidCamera));
    view.handle_key(key(KeyCode::Char('f')));
    assert_eq!(view.session.facing(), Facing::Back);
    view.take_notice();

    view.handle_key(key(KeyCode::Char(' ')));
    settle(&mut view).await;
    view.handle_key(key(KeyCode::Char('f')));
    assert_eq!(view.session.facing(), Facing::Back);
    assert!(view.take_notice().is_some());
  }

  #[tokio::test]
  async fn test_switching_camera_mid_capture_uses_new_device() {
    let mut view = view_with(Arc::new(SolidCamera));
    view.handle_key(key(KeyCode::Char(' ')));
    view.handle_key(key(KeyCode::Char('f')));
    assert_eq!(view.session.facing(), Facing::Back);
    settle(&mut view).await;

    assert_eq!(view.session.state(), PhotoState::Captured);
    // SolidCamera shades back-camera frames at 50
    assert_eq!(view.session.current().unwrap().get_pixel(0, 0)[0], 50);
  }

  #[tokio::test]
  async fn test_retake_captures_again() {
    let mut view = view_with(Arc::new(SolidCamera));
    view.handle_key(key(KeyCode::Char(' ')));
    settle(&mut view).await;

    view.handle_key(key(KeyCode::Char('r')));
    assert_eq!(view.session.state(), PhotoState::Capturing);
    settle(&mut view).await;
    assert_eq!(view.session.state(), PhotoState::Captured);
  }

  #[tokio::test]
  async fn test_resume_in_capturing_requests_frame() {
    let mut session = PhotoSession::new();
    session.start_capture().unwrap();
    let request = session.frame_request();
    session
      .capture_succeeded(request, RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])))
      .unwrap();
    session.retake().unwrap();

    let ctx = test_context().with_camera(Arc::new(SolidCamera));
    let mut view = PhotoCaptureView::resume(ctx, "Asha 1".into(), session);
    assert!(view.capture.is_some());
    settle(&mut view).await;
    assert_eq!(view.session.state(), PhotoState::Captured);
  }
}
