//! Wire types for the remote employee endpoint.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::types::Employee;

/// Credentials body sent with the data request
#[derive(Debug, Clone, Serialize)]
pub struct ApiCredentials {
  pub username: String,
  pub password: String,
}

/// Employee as returned by the endpoint.
///
/// The source is loose about types: numbers sometimes arrive as strings and
/// any field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEmployee {
  #[serde(default, deserialize_with = "lenient_u64")]
  pub id: u64,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub department: Option<String>,
  #[serde(default)]
  pub city: Option<String>,
  #[serde(default, deserialize_with = "lenient_u64")]
  pub salary: u64,
  #[serde(default, deserialize_with = "lenient_u64")]
  pub experience: u64,
  #[serde(default)]
  pub join_date: Option<String>,
}

impl ApiEmployee {
  pub fn into_employee(self) -> Employee {
    Employee {
      id: self.id,
      name: self.name.unwrap_or_default(),
      email: self.email.unwrap_or_default(),
      department: self.department.unwrap_or_default(),
      city: self.city.unwrap_or_default(),
      salary: self.salary,
      experience: u32::try_from(self.experience).unwrap_or(u32::MAX),
      join_date: self.join_date.as_deref().and_then(parse_join_date),
    }
  }
}

/// Accept `2023-03-15` or a full RFC 3339 timestamp
pub fn parse_join_date(s: &str) -> Option<NaiveDate> {
  let s = s.trim();
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Number(n)) => n
      .as_u64()
      .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
      .unwrap_or(0),
    Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
    _ => 0,
  })
}
