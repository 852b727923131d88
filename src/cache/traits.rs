//! What the cache stores and how a load reports where its records came from.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// A record type that can live in a cached envelope.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Identity within one list. Records sharing a key are deduplicated on write.
  fn cache_key(&self) -> String;

  /// Prefix for this type's storage keys, e.g. `employees`
  fn entity_type() -> &'static str;
}

/// Records plus their provenance.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  pub data: T,
  pub source: CacheSource,
  /// `None` for placeholder data, which was never fetched
  pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  pub fn from_network(data: T, fetched_at: DateTime<Utc>) -> Self {
    Self::fetched(data, CacheSource::Network, fetched_at)
  }

  pub fn from_cache(data: T, fetched_at: DateTime<Utc>) -> Self {
    Self::fetched(data, CacheSource::CacheFresh, fetched_at)
  }

  fn fetched(data: T, source: CacheSource, fetched_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source,
      fetched_at: Some(fetched_at),
    }
  }

  /// Generated stand-ins after the network failed; `reason` is shown to the user.
  pub fn fallback(data: T, reason: String) -> Self {
    Self {
      data,
      source: CacheSource::Fallback { reason },
      fetched_at: None,
    }
  }

  pub fn is_fallback(&self) -> bool {
    matches!(self.source, CacheSource::Fallback { .. })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched during this load
  Network,
  /// Read from an envelope younger than the freshness window
  CacheFresh,
  /// Fetch failed; records are generated placeholders
  Fallback { reason: String },
}
