//! Directory client with the cache gate and fallback data in front of it.

use std::sync::Arc;

use chrono::Duration;
use color_eyre::Result;

use crate::cache::{CacheLayer, CacheResult, CacheStorage};
use crate::config::Config;

use super::cache::DirectoryQueryKey;
use super::client::DirectoryClient;
use super::synthetic::fallback_employees;
use super::types::Employee;

/// Employee source used by the views.
///
/// Wraps `DirectoryClient` with the persisted envelope and substitutes
/// placeholder records when the fetch fails.
#[derive(Clone)]
pub struct CachedDirectoryClient {
  inner: DirectoryClient,
  cache: CacheLayer,
  key: String,
}

impl CachedDirectoryClient {
  pub fn new(config: &Config, storage: Arc<dyn CacheStorage>) -> Result<Self> {
    let inner = DirectoryClient::new(config)?;
    let cache =
      CacheLayer::new(storage).with_stale_time(Duration::minutes(config.cache.stale_minutes));
    let key = DirectoryQueryKey::Employees {
      endpoint: inner.endpoint().to_string(),
    }
    .cache_key();

    Ok(Self { inner, cache, key })
  }

  /// Storage key of the employee envelope (cleared on logout)
  pub fn envelope_key(&self) -> &str {
    &self.key
  }

  /// The gate every employee load goes through. Clones share its write order.
  pub fn cache(&self) -> &CacheLayer {
    &self.cache
  }

  /// Load employees, reusing the envelope while it is fresh.
  pub async fn load_employees(&self) -> CacheResult<Vec<Employee>> {
    let inner = self.inner.clone();
    self
      .cache
      .fetch_list(
        &self.key,
        move || async move { inner.fetch_employees().await },
        fallback_employees,
      )
      .await
  }

  /// Refetch regardless of freshness; the new set replaces the old wholesale.
  pub async fn refresh_employees(&self) -> CacheResult<Vec<Employee>> {
    let inner = self.inner.clone();
    self
      .cache
      .refresh_list(
        &self.key,
        move || async move { inner.fetch_employees().await },
        fallback_employees,
      )
      .await
  }
}
