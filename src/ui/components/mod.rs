use ratatui::prelude::*;

mod command_input;
mod filter_form;
mod filter_source;
mod input;
mod notice;
mod search_input;

pub use command_input::{CommandEvent, CommandInput};
pub use filter_form::{FilterForm, FilterFormEvent};
pub use input::{InputResult, TextInput};
pub use notice::Notice;
pub use search_input::{SearchEvent, SearchInput};

/// What a component did with a key.
///
/// Views offer every key to their open overlays first; `NotHandled` passes
/// it on to the view's own bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Swallowed without anything for the view to act on
  Handled,
  /// Swallowed, and the view should react to `T`
  Event(T),
  NotHandled,
}

/// Box anchored one cell in from the top-left of `area`, 60% wide within
/// 30..=60 columns, never spilling past the edges.
pub(super) fn corner_popup(area: Rect, height: u16) -> Rect {
  let width = (area.width * 3 / 5)
    .clamp(30, 60)
    .min(area.width.saturating_sub(2));
  let height = height.min(area.height.saturating_sub(1));
  Rect::new(area.x + 1, area.y + 1, width, height)
}

/// `prefix`, the typed text, then a block cursor
pub(super) fn prompt_line<'a>(prefix: &'static str, text: &'a str) -> Line<'a> {
  let accent = Style::default().fg(Color::Yellow);
  Line::from(vec![
    Span::styled(prefix, accent),
    Span::raw(text),
    Span::styled("_", accent),
  ])
}
