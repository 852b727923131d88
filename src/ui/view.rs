use crate::ui::components::Notice;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// One key hint in the header, e.g. `f filters`
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  /// Sort order in the header, ascending
  pub priority: u8,
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// What the app should do with the view stack after a key
pub enum ViewAction {
  None,
  /// Open a screen on top, e.g. dashboard -> employee detail
  Push(Box<dyn View>),
  /// Back to the previous screen
  Pop,
  /// Swap the top screen without growing the breadcrumb, e.g. capture <-> result
  Replace(Box<dyn View>),
  /// Clear the session and local data, then show the login screen
  Logout,
  Quit,
}

/// A screen on the view stack.
///
/// A view owns its overlays (search box, command line, filter form) and
/// offers keys to them before its own bindings. Background loads live in a
/// `Query` that the view polls from `tick`.
pub trait View {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// This screen's segment of the breadcrumb trail
  fn breadcrumb_label(&self) -> String;

  fn tick(&mut self) {}

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "back").with_priority(30)]
  }

  /// A message for the footer, handed over once
  fn take_notice(&mut self) -> Option<Notice> {
    None
  }
}
