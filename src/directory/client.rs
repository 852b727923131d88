use crate::config::{Config, Credentials};
use crate::directory::api_types::{ApiCredentials, ApiEmployee};
use crate::directory::types::Employee;
use color_eyre::{eyre::eyre, Result};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP client for the employee endpoint
#[derive(Clone)]
pub struct DirectoryClient {
  http: reqwest::Client,
  endpoint: Url,
}

impl DirectoryClient {
  pub fn new(config: &Config) -> Result<Self> {
    let endpoint = endpoint_url(&config.api.url, &config.api.endpoint)?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, endpoint })
  }

  pub fn endpoint(&self) -> &str {
    self.endpoint.as_str()
  }

  /// Fetch the full employee list.
  ///
  /// One POST carrying the API credentials; any non-success status is an error.
  pub async fn fetch_employees(&self) -> Result<Vec<Employee>> {
    let credentials = Config::api_credentials()?;
    self.fetch_employees_with(&credentials).await
  }

  async fn fetch_employees_with(&self, credentials: &Credentials) -> Result<Vec<Employee>> {
    let body = ApiCredentials {
      username: credentials.username.clone(),
      password: credentials.password.clone(),
    };

    debug!(endpoint = %self.endpoint, "requesting employee data");
    let response = self
      .http
      .post(self.endpoint.clone())
      .json(&body)
      .send()
      .await
      .map_err(|e| eyre!("Failed to reach {}: {}", self.endpoint, e))?
      .error_for_status()
      .map_err(|e| eyre!("Employee endpoint returned an error: {}", e))?;

    let records: Vec<ApiEmployee> = response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse employee data: {}", e))?;

    Ok(
      records
        .into_iter()
        .map(ApiEmployee::into_employee)
        .collect(),
    )
  }
}

/// Join the configured base URL and endpoint path
fn endpoint_url(base: &str, endpoint: &str) -> Result<Url> {
  let mut base = Url::parse(base).map_err(|e| eyre!("Invalid api.url '{}': {}", base, e))?;
  if !base.path().ends_with('/') {
    let path = format!("{}/", base.path());
    base.set_path(&path);
  }
  base
    .join(endpoint.trim_start_matches('/'))
    .map_err(|e| eyre!("Invalid api.endpoint '{}': {}", endpoint, e))
}
