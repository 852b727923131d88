//! Brightness / contrast / saturation / rotation editing of a still image.

use image::imageops;
use image::RgbaImage;

/// Upper bound for every percentage parameter
pub const MAX_PERCENT: u16 = 200;

/// Step used by the editor keys
pub const PERCENT_STEP: u16 = 10;

/// Clockwise rotation in quarter turns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
  #[default]
  None,
  Quarter,
  Half,
  ThreeQuarter,
}

impl Rotation {
  pub fn degrees(&self) -> u16 {
    match self {
      Rotation::None => 0,
      Rotation::Quarter => 90,
      Rotation::Half => 180,
      Rotation::ThreeQuarter => 270,
    }
  }

  pub fn from_degrees(degrees: u16) -> Self {
    match degrees % 360 {
      90 => Rotation::Quarter,
      180 => Rotation::Half,
      270 => Rotation::ThreeQuarter,
      _ => Rotation::None,
    }
  }

  /// Next quarter turn clockwise
  pub fn turned(&self) -> Self {
    Self::from_degrees(self.degrees() + 90)
  }
}

/// Editor parameters. Percentages are in [0, 200]; 100 leaves the image unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditParams {
  pub brightness: u16,
  pub contrast: u16,
  pub saturation: u16,
  pub rotation: Rotation,
}

impl Default for EditParams {
  fn default() -> Self {
    Self {
      brightness: 100,
      contrast: 100,
      saturation: 100,
      rotation: Rotation::None,
    }
  }
}

/// The adjustable percentage parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
  Brightness,
  Contrast,
  Saturation,
}

impl Adjustment {
  pub const ALL: [Adjustment; 3] = [
    Adjustment::Brightness,
    Adjustment::Contrast,
    Adjustment::Saturation,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      Adjustment::Brightness => "Brightness",
      Adjustment::Contrast => "Contrast",
      Adjustment::Saturation => "Saturation",
    }
  }
}

impl EditParams {
  pub fn is_identity(&self) -> bool {
    *self == Self::default()
  }

  pub fn get(&self, adjustment: Adjustment) -> u16 {
    match adjustment {
      Adjustment::Brightness => self.brightness,
      Adjustment::Contrast => self.contrast,
      Adjustment::Saturation => self.saturation,
    }
  }

  /// Set a percentage, clamped to [0, MAX_PERCENT].
  pub fn set(&mut self, adjustment: Adjustment, value: u16) {
    let value = value.min(MAX_PERCENT);
    match adjustment {
      Adjustment::Brightness => self.brightness = value,
      Adjustment::Contrast => self.contrast = value,
      Adjustment::Saturation => self.saturation = value,
    }
  }

  /// Move a percentage by `steps` editor steps.
  pub fn nudge(&mut self, adjustment: Adjustment, steps: i32) {
    let current = i32::from(self.get(adjustment));
    let next = (current + steps * i32::from(PERCENT_STEP)).clamp(0, i32::from(MAX_PERCENT));
    self.set(adjustment, next as u16);
  }
}

const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

fn adjust_pixel(rgb: [u8; 3], brightness: f32, contrast: f32, saturation: f32) -> [u8; 3] {
  let mut c = rgb.map(|v| f32::from(v) / 255.0);

  for v in c.iter_mut() {
    *v = (*v * brightness).clamp(0.0, 1.0);
  }
  for v in c.iter_mut() {
    *v = ((*v - 0.5) * contrast + 0.5).clamp(0.0, 1.0);
  }

  let luma = c[0] * LUMA[0] + c[1] * LUMA[1] + c[2] * LUMA[2];
  for v in c.iter_mut() {
    *v = (luma + (*v - luma) * saturation).clamp(0.0, 1.0);
  }

  c.map(|v| (v * 255.0).round() as u8)
}

/// Apply `params` to `source`, returning a new image.
///
/// Colour adjustments run per pixel in a fixed order (brightness, contrast,
/// saturation) with alpha untouched, followed by rotation. The result depends
/// only on the inputs.
pub fn apply_edits(source: &RgbaImage, params: &EditParams) -> RgbaImage {
  if params.is_identity() {
    return source.clone();
  }
  let mut out = source.clone();

  if (params.brightness, params.contrast, params.saturation) != (100, 100, 100) {
    let b = f32::from(params.brightness) / 100.0;
    let k = f32::from(params.contrast) / 100.0;
    let s = f32::from(params.saturation) / 100.0;
    for pixel in out.pixels_mut() {
      let [r, g, bl, a] = pixel.0;
      let [r, g, bl] = adjust_pixel([r, g, bl], b, k, s);
      pixel.0 = [r, g, bl, a];
    }
  }

  match params.rotation {
    Rotation::None => out,
    Rotation::Quarter => imageops::rotate90(&out),
    Rotation::Half => imageops::rotate180(&out),
    Rotation::ThreeQuarter => imageops::rotate270(&out),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgba;

  fn test_image() -> RgbaImage {
    RgbaImage::from_fn(4, 3, |x, y| {
      Rgba([(x * 60) as u8, (y * 90) as u8, 200 - (x * 20) as u8, 255 - x as u8])
    })
  }

  #[test]
  fn test_identity_is_lossless() {
    let img = test_image();
    assert_eq!(apply_edits(&img, &EditParams::default()), img);
  }

  #[test]
  fn test_same_inputs_same_bytes() {
    let params = EditParams {
      brightness: 150,
      contrast: 80,
      rotation: Rotation::Half,
      ..EditParams::default()
    };
    let a = apply_edits(&test_image(), &params);
    let b = apply_edits(&test_image(), &params);
    assert_eq!(a.as_raw(), b.as_raw());
    assert_ne!(a.as_raw(), test_image().as_raw());
  }

  #[test]
  fn test_brightness_scales_and_clamps() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([100, 150, 200, 77]));
    let params = EditParams {
      brightness: 150,
      ..EditParams::default()
    };
    let out = apply_edits(&img, &params);
    assert_eq!(out.get_pixel(0, 0).0, [150, 225, 255, 77]);
  }

  #[test]
  fn test_zero_saturation_is_greyscale() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 255]));
    let params = EditParams {
      saturation: 0,
      ..EditParams::default()
    };
    let out = apply_edits(&img, &params);
    assert_eq!(out.get_pixel(0, 0).0, [118, 118, 118, 255]);
  }

  #[test]
  fn test_full_contrast_pushes_to_extremes() {
    let img = RgbaImage::from_fn(2, 1, |x, _| {
      if x == 0 {
        Rgba([10, 10, 10, 255])
      } else {
        Rgba([245, 245, 245, 255])
      }
    });
    let params = EditParams {
      contrast: 200,
      ..EditParams::default()
    };
    let out = apply_edits(&img, &params);
    assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(out.get_pixel(1, 0).0, [255, 255, 255, 255]);
  }

  #[test]
  fn test_rotation_is_clockwise() {
    let img = test_image();
    let quarter = apply_edits(
      &img,
      &EditParams {
        rotation: Rotation::Quarter,
        ..EditParams::default()
      },
    );
    assert_eq!(quarter.dimensions(), (3, 4));
    // Top-left of the source ends up top-right
    assert_eq!(quarter.get_pixel(2, 0), img.get_pixel(0, 0));

    let half = apply_edits(
      &img,
      &EditParams {
        rotation: Rotation::Half,
        ..EditParams::default()
      },
    );
    assert_eq!(half.get_pixel(3, 2), img.get_pixel(0, 0));
  }

  #[test]
  fn test_rotation_cycles() {
    let mut r = Rotation::None;
    for expected in [90, 180, 270, 0] {
      r = r.turned();
      assert_eq!(r.degrees(), expected);
    }
  }

  #[test]
  fn test_nudge_clamps() {
    let mut params = EditParams::default();
    params.nudge(Adjustment::Brightness, 15);
    assert_eq!(params.brightness, MAX_PERCENT);
    params.nudge(Adjustment::Contrast, -11);
    assert_eq!(params.contrast, 0);
    params.nudge(Adjustment::Saturation, 1);
    assert_eq!(params.saturation, 110);
  }
}
