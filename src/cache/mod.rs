//! Local persisted state and the cache-or-fetch gate.
//!
//! This module provides a domain-agnostic caching mechanism that:
//! - Persists keyed entries (a `localStorage` stand-in) in SQLite
//! - Stores whole record lists as timestamped envelopes
//! - Decides fresh vs. stale with one explicit check
//! - Degrades to fallback data when the network fetch fails

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{CacheStorage, MemoryStorage, SqliteStorage};
pub use traits::{CacheResult, CacheSource, Cacheable};
