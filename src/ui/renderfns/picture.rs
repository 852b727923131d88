use image::imageops::{self, FilterType};
use image::RgbaImage;
use ratatui::buffer::Buffer;
use ratatui::prelude::*;

/// Scale `image` to fit `area` keeping its aspect ratio, two pixel rows per
/// cell. Returns the pixel size used.
fn fit(image: &RgbaImage, area: Rect) -> (u32, u32) {
  let max_w = u32::from(area.width);
  let max_h = u32::from(area.height) * 2;
  let (w, h) = image.dimensions();
  if w == 0 || h == 0 || max_w == 0 || max_h == 0 {
    return (0, 0);
  }
  let scale = f64::min(max_w as f64 / w as f64, max_h as f64 / h as f64);
  (
    ((w as f64 * scale).floor() as u32).max(1),
    ((h as f64 * scale).floor() as u32).max(1),
  )
}

/// Blend a pixel over black so transparent areas read as background
fn to_color(px: &image::Rgba<u8>) -> Color {
  let [r, g, b, a] = px.0;
  let mix = |c: u8| (u16::from(c) * u16::from(a) / 255) as u8;
  Color::Rgb(mix(r), mix(g), mix(b))
}

/// Draw `image` centred in `area` using upper half blocks.
pub fn draw_picture(frame: &mut Frame, area: Rect, image: &RgbaImage) {
  render_picture(frame.buffer_mut(), area, image);
}

fn render_picture(buf: &mut Buffer, area: Rect, image: &RgbaImage) {
  let (w, h) = fit(image, area);
  if w == 0 || h == 0 {
    return;
  }
  let scaled = imageops::resize(image, w, h, FilterType::Triangle);

  let cell_rows = h.div_ceil(2);
  let x0 = area.x + (area.width - w as u16) / 2;
  let y0 = area.y + (area.height - cell_rows as u16) / 2;

  for row in 0..cell_rows {
    for col in 0..w {
      let top = to_color(scaled.get_pixel(col, row * 2));
      let bottom = if row * 2 + 1 < h {
        to_color(scaled.get_pixel(col, row * 2 + 1))
      } else {
        Color::Reset
      };
      let pos = (x0 + col as u16, y0 + row as u16);
      if let Some(cell) = buf.cell_mut(pos) {
        cell.set_symbol("▀").set_fg(top).set_bg(bottom);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgba;

  #[test]
  fn test_fit_keeps_aspect() {
    let img = RgbaImage::new(200, 100);
    // 40 cells wide, 10 rows = 20 pixel rows
    assert_eq!(fit(&img, Rect::new(0, 0, 40, 10)), (40, 20));
    assert_eq!(fit(&img, Rect::new(0, 0, 10, 10)), (10, 5));
    assert_eq!(fit(&img, Rect::new(0, 0, 0, 10)), (0, 0));
  }

  #[test]
  fn test_half_blocks_carry_two_pixels() {
    let img = RgbaImage::from_fn(1, 2, |_, y| {
      if y == 0 {
        Rgba([255, 0, 0, 255])
      } else {
        Rgba([0, 0, 255, 255])
      }
    });
    let area = Rect::new(0, 0, 1, 1);
    let mut buf = Buffer::empty(area);
    render_picture(&mut buf, area, &img);

    let cell = &buf[(0, 0)];
    assert_eq!(cell.symbol(), "▀");
    assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
    assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
  }
}
