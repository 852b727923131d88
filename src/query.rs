//! One-shot background loads that views poll from `tick()`.
//!
//! The employee fetch and the camera grab are both "start once, complete
//! once" operations. A `Query<T>` spawns the work on the tokio runtime and
//! keeps only the receiving half of a oneshot channel. Dropping or replacing
//! the query drops that receiver, so a completion that lands after the user
//! navigated away is discarded instead of updating a view that is gone.
//!
//! ```ignore
//! let mut query = Query::new(move || {
//!     let directory = directory.clone();
//!     async move { Ok::<_, String>(directory.load_employees().await) }
//! });
//! query.fetch();
//!
//! // on tick
//! if query.poll() {
//!     if let Some(result) = query.take() { /* install records */ }
//! }
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::time::Instant;
use tokio::sync::oneshot;

/// Where a query is in its single run
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  Idle,
  Loading,
  Success(T),
  Error(String),
}

type Fetcher<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

pub struct Query<T> {
  state: QueryState<T>,
  fetcher: Fetcher<T>,
  pending: Option<oneshot::Receiver<Result<T, String>>>,
  started_at: Option<Instant>,
}

impl<T: Send + 'static> Query<T> {
  /// The fetcher is called once per `fetch()`.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || fetcher().boxed()),
      pending: None,
      started_at: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.state, QueryState::Loading)
  }

  pub fn error(&self) -> Option<&str> {
    match &self.state {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Seconds since the current run started, while loading
  pub fn loading_secs(&self) -> Option<u64> {
    match (&self.state, self.started_at) {
      (QueryState::Loading, Some(at)) => Some(at.elapsed().as_secs()),
      _ => None,
    }
  }

  /// Spawn the fetcher unless a run is already in flight.
  pub fn fetch(&mut self) {
    if self.is_loading() {
      return;
    }

    let (tx, rx) = oneshot::channel();
    let work = (self.fetcher)();
    tokio::spawn(async move {
      // The receiver is gone when the query was dropped
      let _ = tx.send(work.await);
    });

    self.pending = Some(rx);
    self.started_at = Some(Instant::now());
    self.state = QueryState::Loading;
  }

  /// Check for a completion without blocking. `true` when the state changed.
  pub fn poll(&mut self) -> bool {
    let Some(rx) = self.pending.as_mut() else {
      return false;
    };

    self.state = match rx.try_recv() {
      Err(oneshot::error::TryRecvError::Empty) => return false,
      Ok(Ok(data)) => QueryState::Success(data),
      Ok(Err(error)) => QueryState::Error(error),
      // Task panicked or was aborted before sending
      Err(oneshot::error::TryRecvError::Closed) => {
        QueryState::Error("background task ended without a result".to_string())
      }
    };
    self.pending = None;
    true
  }

  /// Move a successful result out, leaving the query idle.
  pub fn take(&mut self) -> Option<T> {
    match std::mem::replace(&mut self.state, QueryState::Idle) {
      QueryState::Success(data) => Some(data),
      other => {
        self.state = other;
        None
      }
    }
  }
}
