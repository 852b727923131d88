//! Cache layer that decides between the persisted envelope and a network fetch.

use chrono::{DateTime, Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::storage::CacheStorage;
use super::traits::{CacheResult, Cacheable};

/// A persisted record list with the time it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
  pub records: Vec<T>,
  pub fetched_at: DateTime<Utc>,
}

/// Outcome of the freshness check on an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
  Fresh,
  Stale,
}

/// Orders envelope writes from concurrent fetches.
///
/// Every fetch takes a ticket before it starts. A finished fetch may write
/// only if its ticket is newer than the last write to that key and was
/// issued after the most recent `clear`.
#[derive(Debug, Default)]
struct WriteGate {
  issued: u64,
  /// Tickets below this were disowned by `clear`
  floor: u64,
  written: HashMap<String, u64>,
}

impl WriteGate {
  fn issue(&mut self) -> u64 {
    self.issued += 1;
    self.issued
  }

  fn admits(&self, key: &str, ticket: u64) -> bool {
    ticket >= self.floor && self.written.get(key).map_or(true, |&last| ticket > last)
  }
}

/// Cache layer that manages the cache-or-fetch decision.
///
/// This layer sits between the views and the network client. A fresh
/// envelope is served without touching the network; anything else triggers
/// exactly one fetch. A failed fetch never surfaces as an error: the caller
/// supplies fallback data instead.
#[derive(Clone)]
pub struct CacheLayer {
  storage: Arc<dyn CacheStorage>,
  /// How long before a cached envelope is considered stale
  stale_time: Duration,
  /// Shared by every clone, so views and the session see the same sequence
  gate: Arc<Mutex<WriteGate>>,
}

impl CacheLayer {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
    Self {
      storage,
      stale_time: Duration::minutes(5),
      gate: Arc::default(),
    }
  }

  fn gate(&self) -> MutexGuard<'_, WriteGate> {
    self.gate.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Delete the envelope under `key` and disown every fetch still in flight,
  /// so none of them can write it back.
  pub fn clear(&self, key: &str) -> Result<()> {
    let mut gate = self.gate();
    gate.floor = gate.issued + 1;
    gate.written.remove(key);
    self.storage.remove(key)
  }

  /// Set the freshness window.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  pub fn storage(&self) -> &Arc<dyn CacheStorage> {
    &self.storage
  }

  /// Classify an envelope fetched at `fetched_at` as seen at `now`.
  pub fn freshness(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> Freshness {
    if now - fetched_at > self.stale_time {
      Freshness::Stale
    } else {
      Freshness::Fresh
    }
  }

  /// Read the envelope under `key`. Unreadable entries count as absent.
  pub fn read_envelope<T: Cacheable>(&self, key: &str) -> Option<Envelope<T>> {
    let entry = match self.storage.get(key) {
      Ok(entry) => entry?,
      Err(e) => {
        warn!(key, error = %e, "cache read failed, treating as miss");
        return None;
      }
    };

    match serde_json::from_slice::<Envelope<T>>(&entry.data) {
      Ok(envelope) => Some(envelope),
      Err(e) => {
        warn!(key, error = %e, "cached envelope is corrupt, treating as miss");
        None
      }
    }
  }

  /// Persist `records` as a complete envelope.
  pub fn write_envelope<T: Cacheable>(
    &self,
    key: &str,
    records: &[T],
    fetched_at: DateTime<Utc>,
  ) -> Result<()> {
    let envelope = Envelope {
      records: records.to_vec(),
      fetched_at,
    };
    let data =
      serde_json::to_vec(&envelope).map_err(|e| eyre!("Failed to serialize envelope: {}", e))?;
    self.storage.put(key, &data, fetched_at)
  }

  /// Load a list with a cache-first strategy.
  ///
  /// 1. Fresh envelope - return it, no network call
  /// 2. Missing or stale - fetch once from the network and store a new envelope
  /// 3. Fetch failed - return `fallback()` and leave the envelope untouched
  pub async fn fetch_list<T, F, Fut, G>(
    &self,
    key: &str,
    fetcher: F,
    fallback: G,
  ) -> CacheResult<Vec<T>>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
    G: FnOnce() -> Vec<T>,
  {
    let now = Utc::now();
    if let Some(envelope) = self.read_envelope::<T>(key) {
      match self.freshness(envelope.fetched_at, now) {
        Freshness::Fresh => {
          debug!(key, count = envelope.records.len(), "cache hit");
          return CacheResult::from_cache(envelope.records, envelope.fetched_at);
        }
        Freshness::Stale => debug!(key, "cache stale, refetching"),
      }
    } else {
      debug!(key, "cache miss");
    }

    self.fetch_and_store(key, fetcher, fallback).await
  }

  /// Skip the freshness check and replace the envelope from the network.
  pub async fn refresh_list<T, F, Fut, G>(
    &self,
    key: &str,
    fetcher: F,
    fallback: G,
  ) -> CacheResult<Vec<T>>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
    G: FnOnce() -> Vec<T>,
  {
    self.fetch_and_store(key, fetcher, fallback).await
  }

  async fn fetch_and_store<T, F, Fut, G>(
    &self,
    key: &str,
    fetcher: F,
    fallback: G,
  ) -> CacheResult<Vec<T>>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
    G: FnOnce() -> Vec<T>,
  {
    let ticket = self.gate().issue();
    match fetcher().await {
      Ok(records) => {
        let records = dedupe_by_key(records);
        let fetched_at = Utc::now();
        self.store_if_current(key, ticket, &records, fetched_at);
        info!(key, count = records.len(), "loaded from network");
        CacheResult::from_network(records, fetched_at)
      }
      Err(e) => {
        warn!(key, error = %e, "fetch failed, substituting fallback data");
        CacheResult::fallback(fallback(), e.to_string())
      }
    }
  }
}

impl CacheLayer {
  /// Write the envelope unless a newer fetch or a `clear` got there first.
  /// The gate stays locked across the write so a `clear` cannot interleave.
  fn store_if_current<T: Cacheable>(
    &self,
    key: &str,
    ticket: u64,
    records: &[T],
    fetched_at: DateTime<Utc>,
  ) {
    let mut gate = self.gate();
    if !gate.admits(key, ticket) {
      debug!(key, ticket, "superseded fetch, envelope left alone");
      return;
    }
    match self.write_envelope(key, records, fetched_at) {
      Ok(()) => {
        gate.written.insert(key.to_string(), ticket);
      }
      Err(e) => warn!(key, error = %e, "failed to persist envelope"),
    }
  }
}

/// Keep the first record for each cache key.
fn dedupe_by_key<T: Cacheable>(records: Vec<T>) -> Vec<T> {
  let mut seen = HashSet::new();
  let before = records.len();
  let kept: Vec<T> = records
    .into_iter()
    .filter(|r| seen.insert(r.cache_key()))
    .collect();
  if kept.len() != before {
    warn!(
      dropped = before - kept.len(),
      entity = T::entity_type(),
      "dropped records with duplicate identifiers"
    );
  }
  kept
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheSource, MemoryStorage};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use tokio::sync::oneshot;
  use tokio::task::JoinHandle;

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Row {
    id: u32,
  }

  impl Cacheable for Row {
    fn cache_key(&self) -> String {
      self.id.to_string()
    }

    fn entity_type() -> &'static str {
      "row"
    }
  }

  fn rows(ids: &[u32]) -> Vec<Row> {
    ids.iter().map(|&id| Row { id }).collect()
  }

  fn layer() -> CacheLayer {
    CacheLayer::new(Arc::new(MemoryStorage::new()))
  }

  async fn load(layer: &CacheLayer, calls: &AtomicUsize, fail: bool) -> CacheResult<Vec<Row>> {
    layer
      .fetch_list(
        "rows",
        move || async move {
          calls.fetch_add(1, Ordering::SeqCst);
          if fail {
            Err(eyre!("connection refused"))
          } else {
            Ok(rows(&[1, 2, 3]))
          }
        },
        || rows(&[99]),
      )
      .await
  }

  /// Refresh on another task whose fetch signals once it is running and then
  /// waits to be released.
  fn held_refresh(
    layer: &CacheLayer,
    ids: &'static [u32],
  ) -> (oneshot::Receiver<()>, oneshot::Sender<()>, JoinHandle<CacheResult<Vec<Row>>>) {
    let (started_tx, started_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let layer = layer.clone();
    let handle = tokio::spawn(async move {
      layer
        .refresh_list(
          "rows",
          move || async move {
            let _ = started_tx.send(());
            let _ = release_rx.await;
            Ok(rows(ids))
          },
          Vec::new,
        )
        .await
    });
    (started_rx, release_tx, handle)
  }

  #[tokio::test]
  async fn test_miss_fetches_once_and_stores() {
    let layer = layer();
    let calls = AtomicUsize::new(0);

    let result = load(&layer, &calls, false).await;
    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.data, rows(&[1, 2, 3]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(layer.read_envelope::<Row>("rows").is_some());
  }

  #[tokio::test]
  async fn test_fresh_envelope_makes_no_network_call() {
    let layer = layer();
    layer
      .write_envelope("rows", &rows(&[5]), Utc::now())
      .unwrap();
    let calls = AtomicUsize::new(0);

    let result = load(&layer, &calls, false).await;
    assert_eq!(result.source, CacheSource::CacheFresh);
    assert_eq!(result.data, rows(&[5]));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_stale_envelope_fetches_exactly_once() {
    let layer = layer();
    let old = Utc::now() - Duration::minutes(6);
    layer.write_envelope("rows", &rows(&[5]), old).unwrap();
    let calls = AtomicUsize::new(0);

    let result = load(&layer, &calls, false).await;
    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // The refreshed envelope now serves the next load
    let result = load(&layer, &calls, false).await;
    assert_eq!(result.source, CacheSource::CacheFresh);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_fetch_failure_degrades_to_fallback() {
    let layer = layer();
    let calls = AtomicUsize::new(0);

    let result = load(&layer, &calls, true).await;
    assert!(result.is_fallback());
    assert_eq!(result.data, rows(&[99]));
    assert!(result.fetched_at.is_none());
    // Fallback data is never persisted
    assert!(layer.read_envelope::<Row>("rows").is_none());
  }

  #[tokio::test]
  async fn test_refresh_bypasses_fresh_envelope() {
    let layer = layer();
    layer.write_envelope("rows", &rows(&[5]), Utc::now()).unwrap();

    let result = layer
      .refresh_list("rows", || async { Ok(rows(&[7, 8])) }, Vec::new)
      .await;
    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.data, rows(&[7, 8]));
  }

  #[tokio::test]
  async fn test_clear_disowns_fetch_in_flight() {
    let layer = layer();
    let (started, release, handle) = held_refresh(&layer, &[1, 2]);
    started.await.unwrap();

    layer.clear("rows").unwrap();
    release.send(()).unwrap();
    let result = handle.await.unwrap();

    // The caller still gets its records, they are just not persisted
    assert_eq!(result.data, rows(&[1, 2]));
    assert!(layer.read_envelope::<Row>("rows").is_none());

    // Fetches started after the clear persist as usual
    let calls = AtomicUsize::new(0);
    load(&layer, &calls, false).await;
    assert!(layer.read_envelope::<Row>("rows").is_some());
  }

  #[tokio::test]
  async fn test_older_refresh_cannot_overwrite_newer() {
    let layer = layer();
    let (started, release, slow) = held_refresh(&layer, &[1]);
    started.await.unwrap();

    layer
      .refresh_list("rows", || async { Ok(rows(&[2])) }, Vec::new)
      .await;
    release.send(()).unwrap();
    slow.await.unwrap();

    let envelope = layer.read_envelope::<Row>("rows").unwrap();
    assert_eq!(envelope.records, rows(&[2]));
  }

  #[test]
  fn test_freshness_boundary() {
    let layer = layer().with_stale_time(Duration::minutes(5));
    let fetched = Utc::now();
    assert_eq!(
      layer.freshness(fetched, fetched + Duration::minutes(5)),
      Freshness::Fresh
    );
    assert_eq!(
      layer.freshness(fetched, fetched + Duration::minutes(5) + Duration::seconds(1)),
      Freshness::Stale
    );
  }

  #[test]
  fn test_dedupe_keeps_first() {
    let kept = dedupe_by_key(rows(&[1, 2, 1, 3, 2]));
    assert_eq!(kept, rows(&[1, 2, 3]));
  }

  #[test]
  fn test_corrupt_envelope_is_a_miss() {
    let layer = layer();
    layer
      .storage()
      .put("rows", b"{not json", Utc::now())
      .unwrap();
    assert!(layer.read_envelope::<Row>("rows").is_none());
  }
}
