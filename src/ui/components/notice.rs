use std::time::{Duration, Instant};

use ratatui::prelude::Color;

/// How long a transient notice stays in the footer
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
  Info,
  Success,
  Warning,
  Error,
}

impl NoticeLevel {
  pub fn color(&self) -> Color {
    match self {
      NoticeLevel::Info => Color::Cyan,
      NoticeLevel::Success => Color::Green,
      NoticeLevel::Warning => Color::Yellow,
      NoticeLevel::Error => Color::Red,
    }
  }
}

/// A short message shown in the footer until it expires
#[derive(Debug, Clone)]
pub struct Notice {
  pub message: String,
  pub level: NoticeLevel,
  shown_at: Instant,
}

impl Notice {
  pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      level,
      shown_at: Instant::now(),
    }
  }

  pub fn info(message: impl Into<String>) -> Self {
    Self::new(NoticeLevel::Info, message)
  }

  pub fn success(message: impl Into<String>) -> Self {
    Self::new(NoticeLevel::Success, message)
  }

  pub fn warning(message: impl Into<String>) -> Self {
    Self::new(NoticeLevel::Warning, message)
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self::new(NoticeLevel::Error, message)
  }

  pub fn is_expired(&self) -> bool {
    self.shown_at.elapsed() > NOTICE_TTL
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fresh_notice_is_visible() {
    let notice = Notice::warning("Using placeholder data");
    assert!(!notice.is_expired());
    assert_eq!(notice.level.color(), Color::Yellow);
  }
}
