use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Custom title for the header (defaults to "Employee Dashboard")
  pub title: Option<String>,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub table: TableConfig,
  #[serde(default)]
  pub exports: ExportsConfig,
  #[serde(default)]
  pub camera: CameraConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  pub url: String,
  #[serde(default = "default_endpoint")]
  pub endpoint: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_endpoint() -> String {
  "/gettabledata.php".to_string()
}

fn default_timeout_secs() -> u64 {
  15
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Freshness window for the cached employee list
  #[serde(default = "default_stale_minutes")]
  pub stale_minutes: i64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_minutes: default_stale_minutes(),
    }
  }
}

fn default_stale_minutes() -> i64 {
  5
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
  #[serde(default = "default_page_size")]
  pub page_size: usize,
}

impl Default for TableConfig {
  fn default() -> Self {
    Self {
      page_size: default_page_size(),
    }
  }
}

fn default_page_size() -> usize {
  10
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportsConfig {
  /// Where downloads land (defaults to the user's download dir)
  pub directory: Option<PathBuf>,
  /// Program that receives a file path to share it; absent means download only
  pub share_command: Option<String>,
}

impl ExportsConfig {
  pub fn resolved_directory(&self) -> PathBuf {
    self
      .directory
      .clone()
      .or_else(dirs::download_dir)
      .unwrap_or_else(|| PathBuf::from("."))
  }
}

/// Still frames standing in for the front and back camera devices
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CameraConfig {
  pub front: Option<PathBuf>,
  pub back: Option<PathBuf>,
}

/// A username/password pair read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./staffdir.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/staffdir/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/staffdir/config.yaml\n\
                 See staffdir.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("staffdir.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("staffdir").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))?;
    if config.table.page_size == 0 {
      return Err(eyre!("table.page_size must be at least 1"));
    }
    if config.cache.stale_minutes < 0 {
      return Err(eyre!("cache.stale_minutes must not be negative"));
    }
    Ok(config)
  }

  pub fn title(&self) -> &str {
    self.title.as_deref().unwrap_or("Employee Dashboard")
  }

  /// Credentials posted to the employee endpoint.
  ///
  /// Reads STAFFDIR_API_USERNAME and STAFFDIR_API_PASSWORD.
  pub fn api_credentials() -> Result<Credentials> {
    read_credentials("STAFFDIR_API_USERNAME", "STAFFDIR_API_PASSWORD")
  }

  /// The single account allowed to log in.
  ///
  /// Reads STAFFDIR_LOGIN_USERNAME and STAFFDIR_LOGIN_PASSWORD.
  pub fn login_credentials() -> Result<Credentials> {
    read_credentials("STAFFDIR_LOGIN_USERNAME", "STAFFDIR_LOGIN_PASSWORD")
  }
}

fn read_credentials(user_var: &str, password_var: &str) -> Result<Credentials> {
  let username = std::env::var(user_var)
    .map_err(|_| eyre!("{} is not set. Export it before starting staffdir.", user_var))?;
  let password = std::env::var(password_var)
    .map_err(|_| eyre!("{} is not set. Export it before starting staffdir.", password_var))?;
  Ok(Credentials { username, password })
}
