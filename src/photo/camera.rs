use std::path::PathBuf;

use image::RgbaImage;
use tracing::warn;

use super::PhotoError;
use crate::config::CameraConfig;

/// Which device the camera reads from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
  #[default]
  Front,
  Back,
}

impl Facing {
  pub fn toggled(&self) -> Self {
    match self {
      Facing::Front => Facing::Back,
      Facing::Back => Facing::Front,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Facing::Front => "front",
      Facing::Back => "back",
    }
  }
}

/// A source of still frames.
pub trait Camera: Send + Sync {
  /// Grab one frame from the device facing `facing`.
  fn capture(&self, facing: Facing) -> Result<RgbaImage, PhotoError>;
}

/// Camera backed by a still image per facing.
#[derive(Debug, Clone, Default)]
pub struct FileCamera {
  front: Option<PathBuf>,
  back: Option<PathBuf>,
}

impl FileCamera {
  pub fn new(config: &CameraConfig) -> Self {
    Self {
      front: config.front.clone(),
      back: config.back.clone(),
    }
  }
}

impl Camera for FileCamera {
  fn capture(&self, facing: Facing) -> Result<RgbaImage, PhotoError> {
    let path = match facing {
      Facing::Front => self.front.as_ref(),
      Facing::Back => self.back.as_ref(),
    }
    .ok_or_else(|| PhotoError::Camera(format!("no {} camera configured", facing.label())))?;

    image::open(path).map(|img| img.to_rgba8()).map_err(|e| {
      warn!(path = %path.display(), error = %e, "Camera capture failed");
      PhotoError::Camera(format!("{}: {}", path.display(), e))
    })
  }
}
