//! Terminal input and the UI clock, merged into one stream for the app loop.

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::error;

#[derive(Debug)]
pub enum Event {
  Key(KeyEvent),
  /// No input for one tick period; views poll their background loads
  Tick,
}

pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Start the reader. A `Tick` is sent whenever `tick_rate` passes without a key.
  ///
  /// If the terminal stops answering, the reader logs once and exits; the
  /// stream then ends and the app loop shuts down.
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // crossterm's poll/read block the calling thread
    tokio::task::spawn_blocking(move || {
      while let Some(next) = next_event(tick_rate, event::poll, event::read) {
        // Receiver dropped: the app has exited
        if tx.send(next).is_err() {
          return;
        }
      }
    });

    Self { rx }
  }

  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

/// Block for up to `tick_rate` for a key press. `None` when the terminal
/// can no longer be read.
fn next_event<P, R>(tick_rate: Duration, mut poll: P, mut read: R) -> Option<Event>
where
  P: FnMut(Duration) -> io::Result<bool>,
  R: FnMut() -> io::Result<CrosstermEvent>,
{
  loop {
    let ready = match poll(tick_rate) {
      Ok(ready) => ready,
      Err(e) => {
        error!(error = %e, "Terminal input failed, stopping event reader");
        return None;
      }
    };
    if !ready {
      return Some(Event::Tick);
    }
    match read() {
      // Windows also reports releases and repeats
      Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
        return Some(Event::Key(key))
      }
      Ok(_) => continue,
      Err(e) => {
        error!(error = %e, "Terminal input failed, stopping event reader");
        return None;
      }
    }
  }
}
