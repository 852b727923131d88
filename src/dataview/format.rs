//! Display formatting for money and dates.

use chrono::NaiveDate;

/// Group digits the Indian way: last three, then pairs (`12,34,567`).
pub fn group_indian(n: u64) -> String {
  let digits = n.to_string();
  if digits.len() <= 3 {
    return digits;
  }

  let (head, tail) = digits.split_at(digits.len() - 3);
  let mut groups: Vec<&str> = Vec::new();
  let mut end = head.len();
  while end > 0 {
    let start = end.saturating_sub(2);
    groups.push(&head[start..end]);
    end = start;
  }
  groups.reverse();
  format!("{},{}", groups.join(","), tail)
}

/// Rupee amount with Indian grouping, e.g. `₹1,23,456`
pub fn format_inr(amount: u64) -> String {
  format!("₹{}", group_indian(amount))
}

/// Rounded mean rendered as money
pub fn format_inr_f64(amount: f64) -> String {
  format_inr(amount.max(0.0).round() as u64)
}

/// `15 March 2023`
pub fn format_long_date(date: NaiveDate) -> String {
  date.format("%-d %B %Y").to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_group_indian() {
    assert_eq!(group_indian(0), "0");
    assert_eq!(group_indian(999), "999");
    assert_eq!(group_indian(1_000), "1,000");
    assert_eq!(group_indian(75_000), "75,000");
    assert_eq!(group_indian(123_456), "1,23,456");
    assert_eq!(group_indian(12_345_678), "1,23,45,678");
  }

  #[test]
  fn test_format_inr() {
    assert_eq!(format_inr(50_000), "₹50,000");
    assert_eq!(format_inr_f64(79_999.5), "₹80,000");
  }

  #[test]
  fn test_format_long_date() {
    let date = NaiveDate::from_ymd_opt(2023, 3, 15).unwrap();
    assert_eq!(format_long_date(date), "15 March 2023");
  }
}
