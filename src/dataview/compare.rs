//! Side-by-side comparison of two employees.

use std::cmp::Ordering;

use crate::directory::Employee;

/// Which side of a comparison row comes out ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
  Left,
  Right,
  Tie,
  /// The metric is not ranked (e.g. city)
  Unranked,
}

/// One row of the comparison table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
  pub label: &'static str,
  pub left: String,
  pub right: String,
  pub winner: Winner,
}

fn ranked(ord: Ordering, higher_is_better: bool) -> Winner {
  match (ord, higher_is_better) {
    (Ordering::Equal, _) => Winner::Tie,
    (Ordering::Greater, true) | (Ordering::Less, false) => Winner::Left,
    _ => Winner::Right,
  }
}

/// Build the comparison rows. `format_salary` renders money for display.
pub fn compare(
  left: &Employee,
  right: &Employee,
  format_salary: impl Fn(u64) -> String,
) -> Vec<ComparisonRow> {
  let year = |e: &Employee| e.join_date.map(|d| chrono::Datelike::year(&d));
  let year_text = |y: Option<i32>| y.map(|y| y.to_string()).unwrap_or_else(|| "N/A".into());

  let join_winner = match (year(left), year(right)) {
    // Earlier join year ranks higher
    (Some(a), Some(b)) => ranked(a.cmp(&b), false),
    _ => Winner::Unranked,
  };

  vec![
    ComparisonRow {
      label: "Salary",
      left: format_salary(left.salary),
      right: format_salary(right.salary),
      winner: ranked(left.salary.cmp(&right.salary), true),
    },
    ComparisonRow {
      label: "Experience",
      left: format!("{}y", left.experience),
      right: format!("{}y", right.experience),
      winner: ranked(left.experience.cmp(&right.experience), true),
    },
    ComparisonRow {
      label: "Location",
      left: left.city.clone(),
      right: right.city.clone(),
      winner: Winner::Unranked,
    },
    ComparisonRow {
      label: "Department",
      left: left.department.clone(),
      right: right.department.clone(),
      winner: Winner::Unranked,
    },
    ComparisonRow {
      label: "Join Year",
      left: year_text(year(left)),
      right: year_text(year(right)),
      winner: join_winner,
    },
  ]
}
