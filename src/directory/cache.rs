//! Caching implementations for directory types.

use sha2::{Digest, Sha256};

use crate::cache::Cacheable;

use super::types::Employee;

impl Cacheable for Employee {
  fn cache_key(&self) -> String {
    self.id.to_string()
  }

  fn entity_type() -> &'static str {
    "employees"
  }
}

/// Storage keys for directory data.
#[derive(Clone, Debug)]
pub enum DirectoryQueryKey {
  /// The full employee list served by one endpoint
  Employees { endpoint: String },
}

impl DirectoryQueryKey {
  /// Stable storage key, e.g. `employees:3f2a...`
  pub fn cache_key(&self) -> String {
    match self {
      Self::Employees { endpoint } => {
        format!("{}:{}", Employee::entity_type(), hash(&normalize_url(endpoint)))
      }
    }
  }
}

/// SHA256 hash for stable, fixed-length keys
fn hash(input: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(input.as_bytes());
  hex::encode(hasher.finalize())
}

/// Trailing slashes and case do not change which source is meant.
fn normalize_url(url: &str) -> String {
  url.trim().trim_end_matches('/').to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(endpoint: &str) -> String {
    DirectoryQueryKey::Employees {
      endpoint: endpoint.to_string(),
    }
    .cache_key()
  }

  #[test]
  fn test_key_is_namespaced_and_fixed_length() {
    let k = key("https://hr.example.test/gettabledata.php");
    assert!(k.starts_with("employees:"));
    assert_eq!(k.len(), "employees:".len() + 64);
  }

  #[test]
  fn test_equivalent_urls_share_a_key() {
    assert_eq!(
      key("https://HR.example.test/data/"),
      key("https://hr.example.test/data")
    );
    assert_ne!(key("https://a.test/data"), key("https://b.test/data"));
  }
}
