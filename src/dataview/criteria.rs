use std::cmp::Ordering;

use thiserror::Error;

use crate::directory::Employee;

/// Problems with user-entered filter bounds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
  #[error("{field}: '{input}' is not a whole number")]
  NotANumber { field: &'static str, input: String },
  #[error("{field}: minimum {min} is above maximum {max}")]
  InvertedRange {
    field: &'static str,
    min: u64,
    max: u64,
  },
}

/// Closed numeric range; a missing bound is unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeFilter {
  pub min: Option<u64>,
  pub max: Option<u64>,
}

impl RangeFilter {
  /// Parse bounds from text inputs. Blank input means no bound.
  pub fn parse(field: &'static str, min: &str, max: &str) -> Result<Self, FilterError> {
    let range = Self {
      min: parse_bound(field, min)?,
      max: parse_bound(field, max)?,
    };
    if let (Some(min), Some(max)) = (range.min, range.max) {
      if min > max {
        return Err(FilterError::InvertedRange { field, min, max });
      }
    }
    Ok(range)
  }

  pub fn is_active(&self) -> bool {
    self.min.is_some() || self.max.is_some()
  }

  pub fn contains(&self, value: u64) -> bool {
    self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
  }
}

fn parse_bound(field: &'static str, input: &str) -> Result<Option<u64>, FilterError> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }
  trimmed
    .parse()
    .map(Some)
    .map_err(|_| FilterError::NotANumber {
      field,
      input: trimmed.to_string(),
    })
}

/// Structured constraints, combined with AND. `None` imposes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
  pub department: Option<String>,
  pub city: Option<String>,
  pub salary: RangeFilter,
  pub experience: RangeFilter,
}

impl Filters {
  pub fn is_empty(&self) -> bool {
    self.active_count() == 0
  }

  /// Number of active constraints (for the "Filters (n)" badge)
  pub fn active_count(&self) -> usize {
    [
      self.department.is_some(),
      self.city.is_some(),
      self.salary.is_active(),
      self.experience.is_active(),
    ]
    .iter()
    .filter(|active| **active)
    .count()
  }

  pub fn matches(&self, employee: &Employee) -> bool {
    self
      .department
      .as_ref()
      .map_or(true, |d| &employee.department == d)
      && self.city.as_ref().map_or(true, |c| &employee.city == c)
      && self.salary.contains(employee.salary)
      && self.experience.contains(u64::from(employee.experience))
  }
}

/// Columns the table can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
  Id,
  Name,
  Email,
  Department,
  City,
  Salary,
  Experience,
  JoinDate,
}

impl SortField {
  pub fn label(&self) -> &'static str {
    match self {
      SortField::Id => "id",
      SortField::Name => "name",
      SortField::Email => "email",
      SortField::Department => "department",
      SortField::City => "city",
      SortField::Salary => "salary",
      SortField::Experience => "experience",
      SortField::JoinDate => "join date",
    }
  }

  /// Three-way comparison on this field alone
  pub fn compare(&self, a: &Employee, b: &Employee) -> Ordering {
    match self {
      SortField::Id => a.id.cmp(&b.id),
      SortField::Name => a.name.cmp(&b.name),
      SortField::Email => a.email.cmp(&b.email),
      SortField::Department => a.department.cmp(&b.department),
      SortField::City => a.city.cmp(&b.city),
      SortField::Salary => a.salary.cmp(&b.salary),
      SortField::Experience => a.experience.cmp(&b.experience),
      SortField::JoinDate => a.join_date.cmp(&b.join_date),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
  #[default]
  Ascending,
  Descending,
}

impl SortDirection {
  pub fn arrow(&self) -> &'static str {
    match self {
      SortDirection::Ascending => "↑",
      SortDirection::Descending => "↓",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
  pub field: SortField,
  pub direction: SortDirection,
}

/// Everything that decides which records are shown, and in what order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewCriteria {
  pub query: String,
  pub filters: Filters,
  /// `None` keeps fetch order
  pub sort: Option<SortSpec>,
}

impl ViewCriteria {
  /// Select a sort column.
  ///
  /// The current column flips direction; a different column starts ascending.
  pub fn toggle_sort(&mut self, field: SortField) {
    self.sort = Some(match self.sort {
      Some(spec) if spec.field == field => SortSpec {
        field,
        direction: match spec.direction {
          SortDirection::Ascending => SortDirection::Descending,
          SortDirection::Descending => SortDirection::Ascending,
        },
      },
      _ => SortSpec {
        field,
        direction: SortDirection::Ascending,
      },
    });
  }

  pub fn clear_sort(&mut self) {
    self.sort = None;
  }
}

/// Case-insensitive substring match against every field of the record.
pub fn matches_query(employee: &Employee, needle_lower: &str) -> bool {
  needle_lower.is_empty()
    || employee
      .field_strings()
      .iter()
      .any(|value| value.to_lowercase().contains(needle_lower))
}

/// Reduce `records` to the displayed list.
///
/// One filter pass (text search AND structured filters) over the full set,
/// then a stable sort. The input is left untouched.
pub fn apply(records: &[Employee], criteria: &ViewCriteria) -> Vec<Employee> {
  let needle = criteria.query.trim().to_lowercase();

  let mut shown: Vec<Employee> = records
    .iter()
    .filter(|e| matches_query(e, &needle) && criteria.filters.matches(e))
    .cloned()
    .collect();

  if let Some(spec) = criteria.sort {
    // sort_by is stable, ties keep fetch order
    shown.sort_by(|a, b| {
      let ord = spec.field.compare(a, b);
      match spec.direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
      }
    });
  }

  shown
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::directory::synthetic::fallback_employees;
  use chrono::NaiveDate;

  fn emp(id: u64, name: &str, dept: &str, city: &str, salary: u64, exp: u32) -> Employee {
    Employee {
      id,
      name: name.to_string(),
      email: format!("{}@company.com", name.to_lowercase().replace(' ', ".")),
      department: dept.to_string(),
      city: city.to_string(),
      salary,
      experience: exp,
      join_date: NaiveDate::from_ymd_opt(2021, 4, id as u32),
    }
  }

  fn sample() -> Vec<Employee> {
    vec![
      emp(1, "Asha Rao", "Engineering", "Pune", 85_000, 6),
      emp(2, "Ben Cole", "Sales", "Delhi", 40_000, 2),
      emp(3, "Cara Diaz", "Engineering", "Delhi", 60_000, 9),
      emp(4, "Dev Shah", "HR", "Pune", 60_000, 3),
    ]
  }

  fn ids(records: &[Employee]) -> Vec<u64> {
    records.iter().map(|e| e.id).collect()
  }

  #[test]
  fn test_empty_criteria_keeps_everything_in_order() {
    let records = fallback_employees();
    let shown = apply(&records, &ViewCriteria::default());
    assert_eq!(shown, records);
  }

  #[test]
  fn test_query_matches_any_field_case_insensitively() {
    let records = sample();
    let mut criteria = ViewCriteria::default();

    criteria.query = "DELHI".to_string();
    assert_eq!(ids(&apply(&records, &criteria)), vec![2, 3]);

    // Numeric fields match on their text form
    criteria.query = "85000".to_string();
    assert_eq!(ids(&apply(&records, &criteria)), vec![1]);

    criteria.query = "2021-04-04".to_string();
    assert_eq!(ids(&apply(&records, &criteria)), vec![4]);

    criteria.query = "zzz".to_string();
    assert!(apply(&records, &criteria).is_empty());
  }

  #[test]
  fn test_query_and_filters_compose() {
    let records = sample();
    let criteria = ViewCriteria {
      query: "pune".to_string(),
      filters: Filters {
        department: Some("Engineering".to_string()),
        ..Filters::default()
      },
      sort: None,
    };
    assert_eq!(ids(&apply(&records, &criteria)), vec![1]);
  }

  #[test]
  fn test_range_bounds_are_inclusive() {
    let records = sample();
    let criteria = ViewCriteria {
      filters: Filters {
        salary: RangeFilter {
          min: Some(60_000),
          max: Some(85_000),
        },
        ..Filters::default()
      },
      ..ViewCriteria::default()
    };
    assert_eq!(ids(&apply(&records, &criteria)), vec![1, 3, 4]);
  }

  #[test]
  fn test_filtered_result_is_exact_partition() {
    let records = fallback_employees();
    let filters = Filters {
      department: Some("Engineering".to_string()),
      salary: RangeFilter {
        min: Some(50_000),
        max: Some(90_000),
      },
      ..Filters::default()
    };
    let criteria = ViewCriteria {
      filters: filters.clone(),
      ..ViewCriteria::default()
    };
    let shown = apply(&records, &criteria);

    let expected = records
      .iter()
      .filter(|e| e.department == "Engineering" && (50_000..=90_000).contains(&e.salary))
      .count();
    assert_eq!(shown.len(), expected);
    assert!(shown.iter().all(|e| filters.matches(e)));
    for e in &records {
      if !shown.contains(e) {
        assert!(!filters.matches(e));
      }
    }
  }

  #[test]
  fn test_toggle_sort_flips_then_resets() {
    let mut criteria = ViewCriteria::default();
    criteria.toggle_sort(SortField::Salary);
    assert_eq!(
      criteria.sort,
      Some(SortSpec {
        field: SortField::Salary,
        direction: SortDirection::Ascending
      })
    );
    criteria.toggle_sort(SortField::Salary);
    assert_eq!(
      criteria.sort.map(|s| s.direction),
      Some(SortDirection::Descending)
    );
    criteria.toggle_sort(SortField::Name);
    assert_eq!(
      criteria.sort,
      Some(SortSpec {
        field: SortField::Name,
        direction: SortDirection::Ascending
      })
    );
  }

  #[test]
  fn test_sort_is_stable_and_a_permutation() {
    let records = sample();
    let mut criteria = ViewCriteria::default();

    criteria.toggle_sort(SortField::Salary);
    let asc = apply(&records, &criteria);
    // 3 and 4 tie on salary and keep fetch order
    assert_eq!(ids(&asc), vec![2, 3, 4, 1]);

    criteria.toggle_sort(SortField::Salary);
    let desc = apply(&records, &criteria);
    assert_eq!(ids(&desc), vec![1, 3, 4, 2]);

    let mut sorted_ids = ids(&desc);
    sorted_ids.sort_unstable();
    assert_eq!(sorted_ids, ids(&records));
  }

  #[test]
  fn test_every_field_sorts_without_losing_records() {
    let records = fallback_employees();
    for field in [
      SortField::Id,
      SortField::Name,
      SortField::Email,
      SortField::Department,
      SortField::City,
      SortField::Salary,
      SortField::Experience,
      SortField::JoinDate,
    ] {
      let mut criteria = ViewCriteria::default();
      criteria.toggle_sort(field);
      let asc = apply(&records, &criteria);
      assert!(asc
        .windows(2)
        .all(|w| field.compare(&w[0], &w[1]) != Ordering::Greater));
      criteria.toggle_sort(field);
      let desc = apply(&records, &criteria);
      assert!(desc
        .windows(2)
        .all(|w| field.compare(&w[0], &w[1]) != Ordering::Less));
      assert_eq!(asc.len(), records.len());
      assert_eq!(desc.len(), records.len());
    }
  }

  #[test]
  fn test_range_parse() {
    assert_eq!(
      RangeFilter::parse("Salary", " 50000 ", "").unwrap(),
      RangeFilter {
        min: Some(50_000),
        max: None
      }
    );
    assert!(!RangeFilter::parse("Salary", "", "").unwrap().is_active());
    assert!(matches!(
      RangeFilter::parse("Salary", "abc", ""),
      Err(FilterError::NotANumber { .. })
    ));
    assert!(matches!(
      RangeFilter::parse("Experience", "9", "3"),
      Err(FilterError::InvertedRange { .. })
    ));
  }

  #[test]
  fn test_active_count() {
    let filters = Filters {
      city: Some("Pune".to_string()),
      experience: RangeFilter {
        min: None,
        max: Some(4),
      },
      ..Filters::default()
    };
    assert_eq!(filters.active_count(), 2);
    assert!(Filters::default().is_empty());
  }
}
