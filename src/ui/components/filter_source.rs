use crate::directory::Employee;

/// Trait for filtering a list of items by a value.
///
/// Multiple filter sources can work on the same item type `T`.
/// For example, employees can be narrowed by department or by city.
pub trait FilterSource<T>: Clone + Copy + PartialEq + 'static {
  /// Human-readable label for this filter source
  fn label(&self) -> &'static str;

  /// The field value of one item. Empty values count as missing.
  fn value_of<'a>(&self, item: &'a T) -> Option<&'a str>;

  /// Get unique values from the list for populating pickers, in
  /// first-seen order. Items with a missing value are skipped.
  fn unique_values(&self, items: &[T]) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in items.iter().filter_map(|item| self.value_of(item)) {
      if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
      }
    }
    values
  }

  /// Count items matching `value` exactly
  fn count(&self, items: &[T], value: &str) -> usize {
    items
      .iter()
      .filter(|item| self.value_of(item) == Some(value))
      .count()
  }
}

/// Employee fields that take an equality constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeField {
  Department,
  City,
}

impl FilterSource<Employee> for EmployeeField {
  fn label(&self) -> &'static str {
    match self {
      EmployeeField::Department => "Department",
      EmployeeField::City => "City",
    }
  }

  fn value_of<'a>(&self, item: &'a Employee) -> Option<&'a str> {
    let value = match self {
      EmployeeField::Department => item.department.as_str(),
      EmployeeField::City => item.city.as_str(),
    };
    (!value.is_empty()).then_some(value)
  }
}
