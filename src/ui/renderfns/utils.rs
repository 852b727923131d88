use crate::dataview::compare::Winner;
use ratatui::prelude::Color;

/// Truncate a string to a maximum length in characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Stable colour per department so the same department always looks the same
pub fn department_color(department: &str) -> Color {
  const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Yellow,
    Color::LightBlue,
    Color::LightRed,
  ];
  let sum: usize = department.bytes().map(usize::from).sum();
  PALETTE[sum % PALETTE.len()]
}

/// Colour for the left and right cells of a comparison row
pub fn winner_colors(winner: Winner) -> (Color, Color) {
  match winner {
    Winner::Left => (Color::Green, Color::White),
    Winner::Right => (Color::White, Color::Green),
    Winner::Tie | Winner::Unranked => (Color::White, Color::White),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("₹₹₹₹₹₹", 5), "₹₹...");
  }

  #[test]
  fn test_department_color_is_stable() {
    assert_eq!(department_color("Engineering"), department_color("Engineering"));
  }

  #[test]
  fn test_winner_colors() {
    assert_eq!(winner_colors(Winner::Left).0, Color::Green);
    assert_eq!(winner_colors(Winner::Right).1, Color::Green);
    assert_eq!(winner_colors(Winner::Unranked), (Color::White, Color::White));
  }
}
