//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// A single stored entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
  /// Serialized payload
  pub data: Vec<u8>,
  /// When the entry was written
  pub stored_at: DateTime<Utc>,
}

/// Keyed persistent storage.
///
/// Writes replace the whole entry in one step, so an entry is either absent or
/// complete.
pub trait CacheStorage: Send + Sync {
  /// Read an entry.
  fn get(&self, key: &str) -> Result<Option<StoredEntry>>;

  /// Write (or replace) an entry.
  fn put(&self, key: &str, data: &[u8], stored_at: DateTime<Utc>) -> Result<()>;

  /// Delete an entry. Missing keys are not an error.
  fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage used by `--ephemeral` runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<StoredEntry>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.get(key).cloned())
  }

  fn put(&self, key: &str, data: &[u8], stored_at: DateTime<Utc>) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.insert(
      key.to_string(),
      StoredEntry {
        data: data.to_vec(),
        stored_at,
      },
    );
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.remove(key);
    Ok(())
  }
}

/// SQLite-based storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open the state database at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create state directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open state database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Open a private in-memory database.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory database: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default database path.
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("staffdir").join("state.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(STATE_SCHEMA)
      .map_err(|e| eyre!("Failed to run state migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for the key/value state table.
const STATE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_state (
    key TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    stored_at TEXT NOT NULL
);
"#;

impl CacheStorage for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<StoredEntry>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT data, stored_at FROM local_state WHERE key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read state entry {}: {}", key, e))?;

    match row {
      Some((data, stored_at)) => Ok(Some(StoredEntry {
        data,
        stored_at: parse_datetime(&stored_at)?,
      })),
      None => Ok(None),
    }
  }

  fn put(&self, key: &str, data: &[u8], stored_at: DateTime<Utc>) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO local_state (key, data, stored_at) VALUES (?, ?, ?)",
        params![key, data, stored_at.to_rfc3339()],
      )
      .map_err(|e| eyre!("Failed to store state entry {}: {}", key, e))?;

    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("DELETE FROM local_state WHERE key = ?", params![key])
      .map_err(|e| eyre!("Failed to remove state entry {}: {}", key, e))?;

    Ok(())
  }
}

/// Parse a stored RFC 3339 timestamp.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  fn exercise(storage: &dyn CacheStorage) {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    assert_eq!(storage.get("session").unwrap(), None);

    storage.put("session", b"alice", at).unwrap();
    let entry = storage.get("session").unwrap().unwrap();
    assert_eq!(entry.data, b"alice");
    assert_eq!(entry.stored_at, at);

    // Replace is whole-entry
    let later = at + Duration::minutes(3);
    storage.put("session", b"bob", later).unwrap();
    let entry = storage.get("session").unwrap().unwrap();
    assert_eq!(entry.data, b"bob");
    assert_eq!(entry.stored_at, later);

    storage.remove("session").unwrap();
    assert_eq!(storage.get("session").unwrap(), None);
    // Removing twice is fine
    storage.remove("session").unwrap();
  }

  #[test]
  fn test_sqlite_storage_round_trip() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    exercise(&storage);
  }

  #[test]
  fn test_memory_storage_round_trip() {
    exercise(&MemoryStorage::new());
  }

  #[test]
  fn test_keys_are_independent() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let now = Utc::now();
    storage.put("a", b"1", now).unwrap();
    storage.put("b", b"2", now).unwrap();
    storage.remove("a").unwrap();
    assert!(storage.get("a").unwrap().is_none());
    assert_eq!(storage.get("b").unwrap().unwrap().data, b"2");
  }
}
