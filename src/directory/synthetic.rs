//! Placeholder records shown when the employee endpoint cannot be reached.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::Employee;

/// Number of placeholder records generated on fallback
pub const FALLBACK_COUNT: usize = 50;

/// Seed for the fallback set, so every fallback looks the same
pub const FALLBACK_SEED: u64 = 0x5eed_e3b1;

const NAMES: &[&str] = &[
  "John Doe",
  "Jane Smith",
  "Mike Johnson",
  "Sarah Williams",
  "David Brown",
  "Emma Davis",
  "Chris Wilson",
  "Lisa Anderson",
  "Tom Taylor",
  "Anna Martin",
  "James Garcia",
  "Maria Rodriguez",
  "Robert Lee",
  "Linda Martinez",
  "Michael White",
];

pub const CITIES: &[&str] = &[
  "Mumbai",
  "Delhi",
  "Bangalore",
  "Hyderabad",
  "Chennai",
  "Kolkata",
  "Pune",
  "Ahmedabad",
];

pub const DEPARTMENTS: &[&str] = &[
  "Engineering",
  "Marketing",
  "Sales",
  "HR",
  "Finance",
  "Operations",
];

/// The standard fallback set
pub fn fallback_employees() -> Vec<Employee> {
  synthetic_employees(FALLBACK_COUNT, FALLBACK_SEED)
}

/// Generate `count` records from small fixed value pools.
pub fn synthetic_employees(count: usize, seed: u64) -> Vec<Employee> {
  let mut rng = StdRng::seed_from_u64(seed);

  (0..count)
    .map(|i| {
      let n = i + 1;
      Employee {
        id: n as u64,
        name: format!("{} {}", NAMES[i % NAMES.len()], n),
        email: format!("employee{}@company.com", n),
        salary: rng.gen_range(30_000..130_000),
        city: CITIES[rng.gen_range(0..CITIES.len())].to_string(),
        department: DEPARTMENTS[rng.gen_range(0..DEPARTMENTS.len())].to_string(),
        experience: rng.gen_range(1..=15),
        join_date: NaiveDate::from_ymd_opt(
          rng.gen_range(2020..2025),
          rng.gen_range(1..=12),
          rng.gen_range(1..=28),
        ),
      }
    })
    .collect()
}
