use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::directory::Employee;

pub const CSV_HEADERS: [&str; 7] = [
  "Name",
  "Email",
  "Department",
  "City",
  "Salary",
  "Experience",
  "Join Date",
];

/// Serialize records to CSV text, one row per record in the given order.
///
/// Fields containing delimiters, quotes or newlines are quoted.
pub fn to_csv(records: &[Employee]) -> Result<String> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(CSV_HEADERS)?;

  for e in records {
    writer.write_record([
      e.name.as_str(),
      e.email.as_str(),
      e.department.as_str(),
      e.city.as_str(),
      &e.salary.to_string(),
      &e.experience.to_string(),
      &e.join_date_iso(),
    ])?;
  }

  let bytes = writer
    .into_inner()
    .map_err(|e| eyre!("Failed to flush CSV writer: {}", e))?;
  Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn employee(name: &str) -> Employee {
    Employee {
      id: 7,
      name: name.to_string(),
      email: "a@b.test".to_string(),
      department: "Sales".to_string(),
      city: "Pune".to_string(),
      salary: 45_000,
      experience: 3,
      join_date: NaiveDate::from_ymd_opt(2022, 6, 1),
    }
  }

  #[test]
  fn test_header_and_rows() {
    let text = to_csv(&[employee("Asha Rao")]).unwrap();
    let mut lines = text.lines();
    assert_eq!(
      lines.next(),
      Some("Name,Email,Department,City,Salary,Experience,Join Date")
    );
    assert_eq!(
      lines.next(),
      Some("Asha Rao,a@b.test,Sales,Pune,45000,3,2022-06-01")
    );
    assert_eq!(lines.next(), None);
  }

  #[test]
  fn test_embedded_comma_survives_a_parse() {
    let records = vec![employee("Rao, Asha"), employee("Say \"hi\"")];
    let text = to_csv(&records).unwrap();

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let names: Vec<String> = reader
      .records()
      .map(|r| r.unwrap()[0].to_string())
      .collect();
    assert_eq!(names, vec!["Rao, Asha", "Say \"hi\""]);
  }

  #[test]
  fn test_empty_set_is_header_only() {
    let text = to_csv(&[]).unwrap();
    assert_eq!(text.lines().count(), 1);
  }
}
