//! Capture, edit and hand off a single employee photo.

pub mod camera;
pub mod edit;
pub mod pipeline;
pub mod share;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;

pub use camera::{Camera, FileCamera};
pub use edit::Adjustment;
pub use pipeline::{PhotoSession, PhotoState};
pub use share::{share_file, ShareOutcome};

#[derive(Debug, Error)]
pub enum PhotoError {
  #[error("cannot {action} while {state}")]
  InvalidTransition {
    action: &'static str,
    state: PhotoState,
  },

  #[error("the camera can only be switched before a photo is taken")]
  FacingLocked,

  #[error("frame arrived from a camera that is no longer selected")]
  StaleFrame,

  #[error("no photo has been captured")]
  NothingCaptured,

  #[error("camera unavailable: {0}")]
  Camera(String),

  #[error("failed to encode photo: {0}")]
  Encode(#[from] image::ImageError),
}

/// Encode as JPEG. Alpha is dropped.
pub fn encode_jpeg(image: &RgbaImage) -> Result<Vec<u8>, PhotoError> {
  let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
  let mut bytes = Vec::new();
  DynamicImage::ImageRgb8(rgb).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)?;
  Ok(bytes)
}

/// `<name>-photo-<unix ms>.jpg`, falling back to `employee` for a blank name
pub fn photo_file_name(name: &str, unix_ms: i64) -> String {
  let name = name.trim();
  let name = if name.is_empty() { "employee" } else { name };
  format!("{}-photo-{}.jpg", name, unix_ms)
}
