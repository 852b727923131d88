use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One employee row as held by the dashboard.
///
/// Records are replaced wholesale on refresh and never edited field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  pub id: u64,
  pub name: String,
  pub email: String,
  pub department: String,
  pub city: String,
  /// Whole rupees
  pub salary: u64,
  /// Years
  pub experience: u32,
  pub join_date: Option<NaiveDate>,
}

impl Employee {
  /// Join date as `YYYY-MM-DD`, empty when unknown
  pub fn join_date_iso(&self) -> String {
    self
      .join_date
      .map(|d| d.format("%Y-%m-%d").to_string())
      .unwrap_or_default()
  }

  /// Employee code shown in detail views, e.g. `EMP-00042`
  pub fn code(&self) -> String {
    format!("EMP-{:05}", self.id)
  }

  /// Every field rendered as text, in declaration order.
  ///
  /// Free-text search matches against these.
  pub fn field_strings(&self) -> [String; 8] {
    [
      self.id.to_string(),
      self.name.clone(),
      self.email.clone(),
      self.department.clone(),
      self.city.clone(),
      self.salary.to_string(),
      self.experience.to_string(),
      self.join_date_iso(),
    ]
  }

  /// First letter of the name for avatar badges
  pub fn initial(&self) -> char {
    self
      .name
      .chars()
      .next()
      .map(|c| c.to_ascii_uppercase())
      .unwrap_or('E')
  }
}
