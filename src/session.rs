//! The logged-in user and the state that is torn down on logout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::cache::CacheLayer;
use crate::config::Credentials;

/// Storage key of the persisted session marker
pub const SESSION_KEY: &str = "session";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
  #[error("Invalid username or password")]
  InvalidCredentials,

  #[error("Login is not configured. Set STAFFDIR_LOGIN_USERNAME and STAFFDIR_LOGIN_PASSWORD.")]
  NotConfigured,

  #[error("Username and password are required")]
  MissingInput,
}

/// Persisted record of who logged in and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMarker {
  pub username: String,
  pub login_time: DateTime<Utc>,
}

/// Explicit session context handed to the views that need it.
///
/// Created at start-up from whatever marker is persisted; `login` and
/// `logout` are the only ways the marker changes.
#[derive(Clone)]
pub struct Session {
  /// Same layer the directory loads through, so logout can disown its fetches
  cache: CacheLayer,
  /// Cached record envelope that belongs to this session
  envelope_key: String,
  user: Option<UserMarker>,
}

impl Session {
  /// Load the persisted marker, if any. Unreadable markers count as logged out.
  pub fn restore(cache: CacheLayer, envelope_key: impl Into<String>) -> Self {
    let user = match cache.storage().get(SESSION_KEY) {
      Ok(Some(entry)) => match serde_json::from_slice::<UserMarker>(&entry.data) {
        Ok(marker) => Some(marker),
        Err(e) => {
          warn!(error = %e, "Discarding unreadable session marker");
          None
        }
      },
      Ok(None) => None,
      Err(e) => {
        warn!(error = %e, "Failed to read session marker");
        None
      }
    };

    if let Some(marker) = &user {
      info!(username = %marker.username, "Restored session");
    }

    Self {
      cache,
      envelope_key: envelope_key.into(),
      user,
    }
  }

  pub fn user(&self) -> Option<&UserMarker> {
    self.user.as_ref()
  }

  pub fn is_logged_in(&self) -> bool {
    self.user.is_some()
  }

  /// Compare the submitted pair against the configured account and persist
  /// a marker on success.
  pub fn login(
    &mut self,
    username: &str,
    password: &str,
    allowed: Option<&Credentials>,
  ) -> Result<&UserMarker, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
      return Err(AuthError::MissingInput);
    }
    let allowed = allowed.ok_or(AuthError::NotConfigured)?;
    if username != allowed.username || password != allowed.password {
      warn!(username, "Login rejected");
      return Err(AuthError::InvalidCredentials);
    }

    let marker = UserMarker {
      username: username.to_string(),
      login_time: Utc::now(),
    };
    match serde_json::to_vec(&marker) {
      Ok(data) => {
        if let Err(e) = self.cache.storage().put(SESSION_KEY, &data, marker.login_time) {
          warn!(error = %e, "Failed to persist session marker");
        }
      }
      Err(e) => warn!(error = %e, "Failed to encode session marker"),
    }

    info!(username, "Logged in");
    Ok(self.user.insert(marker))
  }

  /// Clear the marker and the cached records. A load still in flight
  /// cannot put the records back afterwards.
  pub fn logout(&mut self) {
    if let Err(e) = self.cache.storage().remove(SESSION_KEY) {
      warn!(error = %e, "Failed to clear session marker on logout");
    }
    if let Err(e) = self.cache.clear(&self.envelope_key) {
      warn!(key = %self.envelope_key, error = %e, "Failed to clear cached records on logout");
    }
    if let Some(marker) = self.user.take() {
      info!(username = %marker.username, "Logged out");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStorage;
  use crate::directory::synthetic::fallback_employees;
  use crate::directory::Employee;
  use std::sync::Arc;
  use tokio::sync::oneshot;

  const KEY: &str = "employees:abc";

  fn account() -> Credentials {
    Credentials {
      username: "admin".to_string(),
      password: "secret".to_string(),
    }
  }

  fn cache() -> CacheLayer {
    CacheLayer::new(Arc::new(MemoryStorage::new()))
  }

  #[test]
  fn test_login_persists_marker() {
    let cache = cache();
    let mut session = Session::restore(cache.clone(), KEY);
    assert!(!session.is_logged_in());

    session.login("admin", "secret", Some(&account())).unwrap();
    assert_eq!(session.user().unwrap().username, "admin");

    let restored = Session::restore(cache, KEY);
    assert_eq!(restored.user(), session.user());
  }

  #[test]
  fn test_login_failures() {
    let mut session = Session::restore(cache(), "k");
    assert_eq!(
      session.login("admin", "wrong", Some(&account())).unwrap_err(),
      AuthError::InvalidCredentials
    );
    assert_eq!(
      session.login("admin", "secret", None).unwrap_err(),
      AuthError::NotConfigured
    );
    assert_eq!(
      session.login("  ", "secret", Some(&account())).unwrap_err(),
      AuthError::MissingInput
    );
    assert!(!session.is_logged_in());
  }

  #[test]
  fn test_logout_clears_marker_and_envelope() {
    let cache = cache();
    let storage = cache.storage().clone();
    storage.put(KEY, b"[]", Utc::now()).unwrap();
    storage.put("unrelated", b"x", Utc::now()).unwrap();

    let mut session = Session::restore(cache, KEY);
    session.login("admin", "secret", Some(&account())).unwrap();
    session.logout();

    assert!(!session.is_logged_in());
    assert!(storage.get(SESSION_KEY).unwrap().is_none());
    assert!(storage.get(KEY).unwrap().is_none());
    assert!(storage.get("unrelated").unwrap().is_some());
  }

  #[tokio::test]
  async fn test_load_finishing_after_logout_leaves_no_records() {
    let cache = cache();
    let storage = cache.storage().clone();
    let mut session = Session::restore(cache.clone(), KEY);
    session.login("admin", "secret", Some(&account())).unwrap();

    let (started_tx, started_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let load = tokio::spawn(async move {
      cache
        .fetch_list(
          KEY,
          move || async move {
            let _ = started_tx.send(());
            let _ = release_rx.await;
            Ok(fallback_employees())
          },
          Vec::<Employee>::new,
        )
        .await
    });

    started_rx.await.unwrap();
    session.logout();
    release_tx.send(()).unwrap();
    load.await.unwrap();

    assert!(storage.get(KEY).unwrap().is_none());
    assert!(storage.get(SESSION_KEY).unwrap().is_none());
  }

  #[test]
  fn test_corrupt_marker_is_logged_out() {
    let cache = cache();
    cache
      .storage()
      .put(SESSION_KEY, b"not json", Utc::now())
      .unwrap();
    let session = Session::restore(cache, "k");
    assert!(!session.is_logged_in());
  }
}
