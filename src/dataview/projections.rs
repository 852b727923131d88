//! Read-only projections behind the chart, map and analytics views.

use std::collections::HashMap;

use crate::directory::Employee;

/// Bars shown in the salary chart
pub const CHART_TOP_N: usize = 10;

/// Longest label drawn under a bar
const CHART_LABEL_LEN: usize = 15;

/// (label, salary) pairs for the first `CHART_TOP_N` records in display order.
pub fn chart_bars(records: &[Employee]) -> Vec<(String, u64)> {
  records
    .iter()
    .take(CHART_TOP_N)
    .map(|e| {
      let label: String = if e.name.is_empty() {
        "Unknown".to_string()
      } else {
        e.name.chars().take(CHART_LABEL_LEN).collect()
      };
      (label, e.salary)
    })
    .collect()
}

/// Latitude/longitude for the cities the map knows about.
pub const CITY_COORDINATES: &[(&str, f64, f64)] = &[
  ("Mumbai", 19.0760, 72.8777),
  ("Delhi", 28.7041, 77.1025),
  ("Bangalore", 12.9716, 77.5946),
  ("Hyderabad", 17.3850, 78.4867),
  ("Chennai", 13.0827, 80.2707),
  ("Kolkata", 22.5726, 88.3639),
  ("Pune", 18.5204, 73.8567),
  ("Ahmedabad", 23.0225, 72.5714),
];

pub fn city_coordinates(city: &str) -> Option<(f64, f64)> {
  CITY_COORDINATES
    .iter()
    .find(|(name, _, _)| *name == city)
    .map(|&(_, lat, lon)| (lat, lon))
}

/// A map pin: one city with its headcount.
#[derive(Debug, Clone, PartialEq)]
pub struct CityPin {
  pub city: String,
  pub lat: f64,
  pub lon: f64,
  pub count: usize,
}

/// Pins per city, plus the cities that had no coordinates.
///
/// Unknown cities are dropped from the map on purpose; they are reported in
/// `unplaced` so the view can say how many records are not pinned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityClusters {
  pub pins: Vec<CityPin>,
  pub unplaced: Vec<(String, usize)>,
}

impl CityClusters {
  pub fn unplaced_records(&self) -> usize {
    self.unplaced.iter().map(|(_, n)| n).sum()
  }
}

/// Group records by city in first-seen order.
pub fn city_clusters(records: &[Employee]) -> CityClusters {
  let counts = count_in_order(records.iter().map(|e| e.city.as_str()));

  let mut clusters = CityClusters::default();
  for (city, count) in counts {
    match city_coordinates(&city) {
      Some((lat, lon)) => clusters.pins.push(CityPin {
        city,
        lat,
        lon,
        count,
      }),
      None => clusters.unplaced.push((city, count)),
    }
  }
  clusters
}

/// Salary bracket labels, lower bounds inclusive
pub const SALARY_BRACKETS: [&str; 5] = ["0-40K", "40-60K", "60-80K", "80-100K", "100K+"];

fn salary_bracket(salary: u64) -> usize {
  match salary {
    s if s < 40_000 => 0,
    s if s < 60_000 => 1,
    s if s < 80_000 => 2,
    s if s < 100_000 => 3,
    _ => 4,
  }
}

/// Aggregates for the analytics view. Always computed from the full record set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analytics {
  pub total: usize,
  /// Department headcounts in first-seen order
  pub departments: Vec<(String, usize)>,
  /// Counts per `SALARY_BRACKETS` entry
  pub salary_brackets: [usize; 5],
  /// Five-year experience brackets ("0-4y", "5-9y", ...) in ascending order
  pub experience_brackets: Vec<(String, usize)>,
  pub mean_salary: f64,
  pub mean_experience: f64,
}

impl Analytics {
  pub fn department_count(&self) -> usize {
    self.departments.len()
  }

  pub fn compute(records: &[Employee]) -> Self {
    let total = records.len();

    let departments = count_in_order(records.iter().map(|e| {
      if e.department.is_empty() {
        "Unknown"
      } else {
        e.department.as_str()
      }
    }));

    let mut salary_brackets = [0usize; 5];
    for e in records {
      salary_brackets[salary_bracket(e.salary)] += 1;
    }

    let mut by_bracket: HashMap<u32, usize> = HashMap::new();
    for e in records {
      *by_bracket.entry(e.experience / 5 * 5).or_default() += 1;
    }
    let mut lower_bounds: Vec<u32> = by_bracket.keys().copied().collect();
    lower_bounds.sort_unstable();
    let experience_brackets = lower_bounds
      .into_iter()
      .map(|lo| (format!("{}-{}y", lo, lo + 4), by_bracket[&lo]))
      .collect();

    let (mean_salary, mean_experience) = if total == 0 {
      (0.0, 0.0)
    } else {
      let salary_sum: u64 = records.iter().map(|e| e.salary).sum();
      let exp_sum: u64 = records.iter().map(|e| u64::from(e.experience)).sum();
      (
        salary_sum as f64 / total as f64,
        exp_sum as f64 / total as f64,
      )
    };

    Self {
      total,
      departments,
      salary_brackets,
      experience_brackets,
      mean_salary,
      mean_experience,
    }
  }
}

/// Count occurrences, keeping the order values were first seen in.
fn count_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
  let mut counts: Vec<(String, usize)> = Vec::new();
  for value in values {
    match counts.iter_mut().find(|(v, _)| v == value) {
      Some((_, n)) => *n += 1,
      None => counts.push((value.to_string(), 1)),
    }
  }
  counts
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::directory::synthetic::fallback_employees;

  fn emp(id: u64, dept: &str, city: &str, salary: u64, exp: u32) -> Employee {
    Employee {
      id,
      name: format!("Person Number {}", id),
      email: String::new(),
      department: dept.to_string(),
      city: city.to_string(),
      salary,
      experience: exp,
      join_date: None,
    }
  }

  #[test]
  fn test_chart_takes_first_ten_in_display_order() {
    let records = fallback_employees();
    let bars = chart_bars(&records);
    assert_eq!(bars.len(), CHART_TOP_N);
    assert_eq!(bars[0], ("John Doe 1".to_string(), records[0].salary));
    assert!(bars.iter().all(|(label, _)| label.chars().count() <= 15));
  }

  #[test]
  fn test_chart_labels_truncate_and_default() {
    let mut e = emp(1, "HR", "Pune", 10, 1);
    e.name = String::new();
    let bars = chart_bars(&[e, emp(2, "HR", "Pune", 20, 1)]);
    assert_eq!(bars[0].0, "Unknown");
    assert_eq!(bars[1].0, "Person Number 2");
  }

  #[test]
  fn test_city_clusters_drop_unknown_cities() {
    let records = vec![
      emp(1, "HR", "Pune", 1, 1),
      emp(2, "HR", "Atlantis", 1, 1),
      emp(3, "HR", "Pune", 1, 1),
      emp(4, "HR", "Delhi", 1, 1),
    ];
    let clusters = city_clusters(&records);
    assert_eq!(clusters.pins.len(), 2);
    assert_eq!(clusters.pins[0].city, "Pune");
    assert_eq!(clusters.pins[0].count, 2);
    assert_eq!(clusters.unplaced, vec![("Atlantis".to_string(), 1)]);
    assert_eq!(clusters.unplaced_records(), 1);
  }

  #[test]
  fn test_analytics_buckets() {
    let records = vec![
      emp(1, "Engineering", "Pune", 39_999, 0),
      emp(2, "Engineering", "Pune", 40_000, 4),
      emp(3, "Sales", "Pune", 79_999, 5),
      emp(4, "", "Pune", 100_000, 12),
    ];
    let stats = Analytics::compute(&records);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.salary_brackets, [1, 1, 1, 0, 1]);
    assert_eq!(
      stats.departments,
      vec![
        ("Engineering".to_string(), 2),
        ("Sales".to_string(), 1),
        ("Unknown".to_string(), 1)
      ]
    );
    assert_eq!(stats.department_count(), 3);
    assert_eq!(
      stats.experience_brackets,
      vec![
        ("0-4y".to_string(), 2),
        ("5-9y".to_string(), 1),
        ("10-14y".to_string(), 1)
      ]
    );
    assert!((stats.mean_salary - 64_999.5).abs() < 1e-9);
    assert!((stats.mean_experience - 5.25).abs() < 1e-9);
  }

  #[test]
  fn test_analytics_of_nothing() {
    let stats = Analytics::compute(&[]);
    assert_eq!(stats.total, 0);
    assert_eq!(stats.mean_salary, 0.0);
    assert!(stats.departments.is_empty());
  }

  #[test]
  fn test_fallback_set_is_fully_placed() {
    let stats = Analytics::compute(&fallback_employees());
    assert_eq!(stats.salary_brackets.iter().sum::<usize>(), 50);
    assert!(city_clusters(&fallback_employees()).unplaced.is_empty());
  }
}
