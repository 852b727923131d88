use std::fmt;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use super::camera::Facing;
use super::edit::{apply_edits, EditParams};
use super::PhotoError;

/// Where a photo session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoState {
  Idle,
  Capturing,
  Captured,
  Editing,
  Confirmed,
}

impl fmt::Display for PhotoState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      PhotoState::Idle => "idle",
      PhotoState::Capturing => "capturing",
      PhotoState::Captured => "captured",
      PhotoState::Editing => "editing",
      PhotoState::Confirmed => "confirmed",
    };
    f.write_str(name)
  }
}

/// Longest edge of the on-screen copy. A terminal shows far fewer pixels.
pub const PREVIEW_EDGE: u32 = 320;

/// State machine for one capture-and-edit flow.
///
/// The first capture is kept as `original` until a retake; saving an edit
/// replaces `current` only. The screen works from `thumb`, a small copy of
/// `current`, so live edits never touch the full-resolution image.
#[derive(Debug, Clone)]
pub struct PhotoSession {
  state: PhotoState,
  facing: Facing,
  /// Bumped by every frame request; older frames are refused
  request: u64,
  original: Option<RgbaImage>,
  current: Option<RgbaImage>,
  thumb: Option<RgbaImage>,
  /// `thumb` with these params applied, rebuilt only when they change
  edited: Option<(EditParams, RgbaImage)>,
  params: EditParams,
}

impl Default for PhotoSession {
  fn default() -> Self {
    Self::new()
  }
}

impl PhotoSession {
  pub fn new() -> Self {
    Self {
      state: PhotoState::Idle,
      facing: Facing::default(),
      request: 0,
      original: None,
      current: None,
      thumb: None,
      edited: None,
      params: EditParams::default(),
    }
  }

  pub fn state(&self) -> PhotoState {
    self.state
  }

  pub fn facing(&self) -> Facing {
    self.facing
  }

  pub fn params(&self) -> &EditParams {
    &self.params
  }

  pub fn params_mut(&mut self) -> Result<&mut EditParams, PhotoError> {
    self.expect_state("adjust", &[PhotoState::Editing])?;
    Ok(&mut self.params)
  }

  pub fn original(&self) -> Option<&RgbaImage> {
    self.original.as_ref()
  }

  /// The latest saved image
  pub fn current(&self) -> Option<&RgbaImage> {
    self.current.as_ref()
  }

  /// Ticket for the frame the device should deliver next
  pub fn frame_request(&self) -> u64 {
    self.request
  }

  /// Screen-sized view of the photo: the live edit while editing, else the
  /// saved image.
  pub fn preview(&mut self) -> Option<&RgbaImage> {
    if self.state != PhotoState::Editing || self.params.is_identity() {
      return self.thumb.as_ref();
    }
    let thumb = self.thumb.as_ref()?;
    if self.edited.as_ref().map_or(true, |(p, _)| *p != self.params) {
      self.edited = Some((self.params, apply_edits(thumb, &self.params)));
    }
    self.edited.as_ref().map(|(_, image)| image)
  }

  fn set_current(&mut self, image: Option<RgbaImage>) {
    self.thumb = image.as_ref().map(shrink_for_screen);
    self.edited = None;
    self.current = image;
  }

  fn expect_state(&self, action: &'static str, allowed: &[PhotoState]) -> Result<(), PhotoError> {
    if allowed.contains(&self.state) {
      Ok(())
    } else {
      Err(PhotoError::InvalidTransition {
        action,
        state: self.state,
      })
    }
  }

  /// Switch between front and back devices. Only before a frame is held.
  /// Switching mid-capture invalidates the pending frame; the caller should
  /// request a new one from the other device.
  pub fn toggle_facing(&mut self) -> Result<Facing, PhotoError> {
    match self.state {
      PhotoState::Idle => {}
      PhotoState::Capturing => self.request += 1,
      _ => return Err(PhotoError::FacingLocked),
    }
    self.facing = self.facing.toggled();
    Ok(self.facing)
  }

  /// Request a frame from the device
  pub fn start_capture(&mut self) -> Result<(), PhotoError> {
    self.expect_state("capture", &[PhotoState::Idle])?;
    self.request += 1;
    self.state = PhotoState::Capturing;
    Ok(())
  }

  /// The device delivered the frame asked for by `request`
  pub fn capture_succeeded(&mut self, request: u64, frame: RgbaImage) -> Result<(), PhotoError> {
    self.expect_state("accept a frame", &[PhotoState::Capturing])?;
    if request != self.request {
      return Err(PhotoError::StaleFrame);
    }
    self.original = Some(frame.clone());
    self.set_current(Some(frame));
    self.params = EditParams::default();
    self.state = PhotoState::Captured;
    Ok(())
  }

  /// The device failed; back to idle so the user can retry or switch device
  pub fn capture_failed(&mut self) {
    if self.state == PhotoState::Capturing {
      self.state = PhotoState::Idle;
    }
  }

  pub fn begin_edit(&mut self) -> Result<(), PhotoError> {
    self.expect_state("edit", &[PhotoState::Captured])?;
    self.params = EditParams::default();
    self.state = PhotoState::Editing;
    Ok(())
  }

  /// Flatten the edit into a new still image replacing the current one.
  pub fn save_edit(&mut self) -> Result<(), PhotoError> {
    self.expect_state("save", &[PhotoState::Editing])?;
    let current = self.current.as_ref().ok_or(PhotoError::NothingCaptured)?;
    let flattened = apply_edits(current, &self.params);
    self.set_current(Some(flattened));
    self.params = EditParams::default();
    self.state = PhotoState::Captured;
    Ok(())
  }

  /// Leave the editor without changing the image
  pub fn cancel_edit(&mut self) -> Result<(), PhotoError> {
    self.expect_state("cancel editing", &[PhotoState::Editing])?;
    self.params = EditParams::default();
    self.state = PhotoState::Captured;
    Ok(())
  }

  /// Editor reset: parameters back to 100% and no rotation
  pub fn reset_params(&mut self) -> Result<(), PhotoError> {
    self.expect_state("reset", &[PhotoState::Editing])?;
    self.params = EditParams::default();
    Ok(())
  }

  /// Throw away saved edits and go back to the first capture.
  pub fn revert(&mut self) -> Result<(), PhotoError> {
    self.expect_state("revert", &[PhotoState::Captured, PhotoState::Confirmed])?;
    let original = self.original.clone().ok_or(PhotoError::NothingCaptured)?;
    self.set_current(Some(original));
    self.state = PhotoState::Captured;
    Ok(())
  }

  pub fn confirm(&mut self) -> Result<&RgbaImage, PhotoError> {
    self.expect_state("confirm", &[PhotoState::Captured, PhotoState::Confirmed])?;
    self.state = PhotoState::Confirmed;
    self.current.as_ref().ok_or(PhotoError::NothingCaptured)
  }

  /// Discard everything and start a new capture.
  pub fn retake(&mut self) -> Result<(), PhotoError> {
    self.expect_state(
      "retake",
      &[
        PhotoState::Captured,
        PhotoState::Editing,
        PhotoState::Confirmed,
      ],
    )?;
    self.original = None;
    self.set_current(None);
    self.params = EditParams::default();
    self.request += 1;
    self.state = PhotoState::Capturing;
    Ok(())
  }
}

/// Downscale so the longest edge is at most `PREVIEW_EDGE`
fn shrink_for_screen(image: &RgbaImage) -> RgbaImage {
  let (w, h) = image.dimensions();
  let longest = w.max(h);
  if longest <= PREVIEW_EDGE {
    return image.clone();
  }
  let scale = |side: u32| {
    let scaled = u64::from(side) * u64::from(PREVIEW_EDGE) / u64::from(longest);
    scaled.max(1) as u32
  };
  imageops::resize(image, scale(w), scale(h), FilterType::Triangle)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::photo::edit::Rotation;
  use image::Rgba;

  fn frame() -> RgbaImage {
    RgbaImage::from_fn(2, 1, |x, _| Rgba([x as u8 * 100, 50, 50, 255]))
  }

  fn captured() -> PhotoSession {
    let mut session = PhotoSession::new();
    session.start_capture().unwrap();
    let request = session.frame_request();
    session.capture_succeeded(request, frame()).unwrap();
    session
  }

  #[test]
  fn test_happy_path() {
    let mut session = captured();
    assert_eq!(session.state(), PhotoState::Captured);

    session.begin_edit().unwrap();
    session.params_mut().unwrap().rotation = Rotation::Quarter;
    assert_eq!(session.preview().unwrap().dimensions(), (1, 2));
    // Saved image is untouched until save
    assert_eq!(session.current().unwrap().dimensions(), (2, 1));

    session.save_edit().unwrap();
    assert_eq!(session.state(), PhotoState::Captured);
    assert_eq!(session.current().unwrap().dimensions(), (1, 2));
    assert_eq!(session.original().unwrap(), &frame());

    session.confirm().unwrap();
    assert_eq!(session.state(), PhotoState::Confirmed);
  }

  #[test]
  fn test_facing_locked_after_capture() {
    let mut session = PhotoSession::new();
    assert_eq!(session.toggle_facing().unwrap(), Facing::Back);
    session.start_capture().unwrap();
    assert_eq!(session.toggle_facing().unwrap(), Facing::Front);
    let request = session.frame_request();
    session.capture_succeeded(request, frame()).unwrap();

    assert!(matches!(
      session.toggle_facing(),
      Err(PhotoError::FacingLocked)
    ));
    session.begin_edit().unwrap();
    assert!(matches!(
      session.toggle_facing(),
      Err(PhotoError::FacingLocked)
    ));
  }

  #[test]
  fn test_switching_device_mid_capture_refuses_old_frame() {
    let mut session = PhotoSession::new();
    session.start_capture().unwrap();
    let back_camera = session.frame_request();

    session.toggle_facing().unwrap();
    assert!(matches!(
      session.capture_succeeded(back_camera, frame()),
      Err(PhotoError::StaleFrame)
    ));
    assert_eq!(session.state(), PhotoState::Capturing);
    assert!(session.current().is_none());

    let front_camera = session.frame_request();
    session.capture_succeeded(front_camera, frame()).unwrap();
    assert_eq!(session.state(), PhotoState::Captured);
  }

  #[test]
  fn test_preview_is_screen_sized_and_save_is_full_size() {
    let mut session = PhotoSession::new();
    session.start_capture().unwrap();
    let request = session.frame_request();
    session
      .capture_succeeded(request, RgbaImage::from_pixel(640, 480, Rgba([90, 90, 90, 255])))
      .unwrap();
    assert_eq!(session.preview().unwrap().dimensions(), (320, 240));

    session.begin_edit().unwrap();
    session.params_mut().unwrap().brightness = 150;
    session.params_mut().unwrap().rotation = Rotation::Quarter;
    let shown = session.preview().unwrap().clone();
    assert_eq!(shown.dimensions(), (240, 320));
    // Same params again reuse the edited copy
    assert_eq!(session.preview().unwrap(), &shown);
    // Full image untouched while editing
    assert_eq!(session.current().unwrap().dimensions(), (640, 480));

    session.save_edit().unwrap();
    assert_eq!(session.current().unwrap().dimensions(), (480, 640));
    assert_eq!(session.preview().unwrap().dimensions(), (240, 320));

    session.revert().unwrap();
    assert_eq!(session.preview().unwrap().dimensions(), (320, 240));
  }

  #[test]
  fn test_invalid_transitions() {
    let mut session = PhotoSession::new();
    assert!(session.begin_edit().is_err());
    assert!(session.save_edit().is_err());
    assert!(session.capture_succeeded(0, frame()).is_err());
    assert!(session.params_mut().is_err());

    let mut session = captured();
    let err = session.start_capture().unwrap_err();
    assert_eq!(err.to_string(), "cannot capture while captured");
  }

  #[test]
  fn test_capture_failure_returns_to_idle() {
    let mut session = PhotoSession::new();
    session.start_capture().unwrap();
    session.capture_failed();
    assert_eq!(session.state(), PhotoState::Idle);
    assert!(session.current().is_none());
  }

  #[test]
  fn test_revert_restores_original() {
    let mut session = captured();
    session.begin_edit().unwrap();
    session.params_mut().unwrap().brightness = 0;
    session.save_edit().unwrap();
    assert_ne!(session.current().unwrap(), &frame());

    session.revert().unwrap();
    assert_eq!(session.current().unwrap(), &frame());
  }

  #[test]
  fn test_cancel_and_reset_keep_image() {
    let mut session = captured();
    session.begin_edit().unwrap();
    session.params_mut().unwrap().contrast = 10;
    session.reset_params().unwrap();
    assert!(session.params().is_identity());

    session.params_mut().unwrap().contrast = 10;
    session.cancel_edit().unwrap();
    assert_eq!(session.current().unwrap(), &frame());
    assert!(session.params().is_identity());
  }

  #[test]
  fn test_retake_clears_images() {
    let mut session = captured();
    session.retake().unwrap();
    assert_eq!(session.state(), PhotoState::Capturing);
    assert!(session.original().is_none());
    assert!(session.preview().is_none());
  }
}
