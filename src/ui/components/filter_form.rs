use super::filter_source::{EmployeeField, FilterSource};
use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::dataview::criteria::FilterError;
use crate::dataview::{Filters, RangeFilter};
use crate::directory::Employee;
use crate::ui::centered_rect;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the filter form that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterFormEvent {
  /// New structured filters (empty after a reset)
  Applied(Filters),
  Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
  Department,
  City,
  MinSalary,
  MaxSalary,
  MinExperience,
  MaxExperience,
}

const FIELDS: [FormField; 6] = [
  FormField::Department,
  FormField::City,
  FormField::MinSalary,
  FormField::MaxSalary,
  FormField::MinExperience,
  FormField::MaxExperience,
];

impl FormField {
  fn label(&self) -> &'static str {
    match self {
      FormField::Department => EmployeeField::Department.label(),
      FormField::City => EmployeeField::City.label(),
      FormField::MinSalary => "Min salary",
      FormField::MaxSalary => "Max salary",
      FormField::MinExperience => "Min experience",
      FormField::MaxExperience => "Max experience",
    }
  }

  /// Index into the text inputs, for the numeric fields
  fn input_index(&self) -> Option<usize> {
    match self {
      FormField::MinSalary => Some(0),
      FormField::MaxSalary => Some(1),
      FormField::MinExperience => Some(2),
      FormField::MaxExperience => Some(3),
      _ => None,
    }
  }
}

/// One-of picker over the distinct values of a field; index 0 is "All".
/// Each choice shows how many records carry it.
#[derive(Debug, Clone)]
struct Picker {
  field: EmployeeField,
  choices: Vec<(String, usize)>,
  total: usize,
  selected: usize,
}

impl Picker {
  fn new(field: EmployeeField) -> Self {
    Self {
      field,
      choices: Vec::new(),
      total: 0,
      selected: 0,
    }
  }

  fn load(&mut self, records: &[Employee], current: Option<&str>) {
    let field = self.field;
    self.choices = field
      .unique_values(records)
      .into_iter()
      .map(|value| {
        let count = field.count(records, &value);
        (value, count)
      })
      .collect();
    self.total = records.len();
    self.selected = current
      .and_then(|c| self.choices.iter().position(|(v, _)| v == c))
      .map_or(0, |i| i + 1);
  }

  fn cycle(&mut self, delta: i32) {
    let len = self.choices.len() as i32 + 1;
    self.selected = (self.selected as i32 + delta).rem_euclid(len) as usize;
  }

  fn choice(&self) -> Option<&(String, usize)> {
    self.selected.checked_sub(1).and_then(|i| self.choices.get(i))
  }

  fn value(&self) -> Option<String> {
    self.choice().map(|(v, _)| v.clone())
  }

  fn display(&self) -> String {
    match self.choice() {
      Some((value, count)) => format!("{} ({})", value, count),
      None => format!("All ({})", self.total),
    }
  }
}

/// Modal form for department / city / salary / experience constraints
#[derive(Debug, Clone)]
pub struct FilterForm {
  active: bool,
  focus: usize,
  department: Picker,
  city: Picker,
  inputs: [TextInput; 4],
  error: Option<String>,
}

impl Default for FilterForm {
  fn default() -> Self {
    Self {
      active: false,
      focus: 0,
      department: Picker::new(EmployeeField::Department),
      city: Picker::new(EmployeeField::City),
      inputs: Default::default(),
      error: None,
    }
  }
}

impl FilterForm {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the form pre-filled with `current`, pickers populated from `records`.
  pub fn open(&mut self, current: &Filters, records: &[Employee]) {
    self.department.load(records, current.department.as_deref());
    self.city.load(records, current.city.as_deref());

    let bound = |b: Option<u64>| b.map(|v| v.to_string()).unwrap_or_default();
    let values = [
      bound(current.salary.min),
      bound(current.salary.max),
      bound(current.experience.min),
      bound(current.experience.max),
    ];
    for (input, value) in self.inputs.iter_mut().zip(values.iter()) {
      input.set_value(value);
    }

    self.focus = 0;
    self.error = None;
    self.active = true;
  }

  /// Validate the inputs into filters.
  pub fn build(&self) -> Result<Filters, FilterError> {
    Ok(Filters {
      department: self.department.value(),
      city: self.city.value(),
      salary: RangeFilter::parse(
        "Salary",
        self.inputs[0].value(),
        self.inputs[1].value(),
      )?,
      experience: RangeFilter::parse(
        "Experience",
        self.inputs[2].value(),
        self.inputs[3].value(),
      )?,
    })
  }

  fn focused(&self) -> FormField {
    FIELDS[self.focus]
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FilterFormEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.active = false;
        return KeyResult::Event(FilterFormEvent::Cancelled);
      }
      KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.active = false;
        return KeyResult::Event(FilterFormEvent::Applied(Filters::default()));
      }
      KeyCode::Enter => {
        return match self.build() {
          Ok(filters) => {
            self.active = false;
            KeyResult::Event(FilterFormEvent::Applied(filters))
          }
          Err(e) => {
            self.error = Some(e.to_string());
            KeyResult::Handled
          }
        };
      }
      KeyCode::Tab | KeyCode::Down => {
        self.focus = (self.focus + 1) % FIELDS.len();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus = (self.focus + FIELDS.len() - 1) % FIELDS.len();
        return KeyResult::Handled;
      }
      _ => {}
    }

    match self.focused() {
      FormField::Department | FormField::City => {
        let delta = match key.code {
          KeyCode::Left | KeyCode::Char('h') => -1,
          KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => 1,
          _ => 0,
        };
        if delta != 0 {
          if self.focused() == FormField::Department {
            self.department.cycle(delta);
          } else {
            self.city.cycle(delta);
          }
        }
      }
      field => {
        if let Some(idx) = field.input_index() {
          if let InputResult::Consumed = self.inputs[idx].handle_key(key) {
            self.error = None;
          }
        }
      }
    }

    // Modal: swallow everything else
    KeyResult::Handled
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let overlay_area = centered_rect(52, FIELDS.len() as u16 + 6, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Filters ");
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines: Vec<Line> = FIELDS
      .iter()
      .enumerate()
      .map(|(i, field)| {
        let focused = i == self.focus;
        let value = match field {
          FormField::Department => format!("< {} >", self.department.display()),
          FormField::City => format!("< {} >", self.city.display()),
          other => {
            let input = other.input_index().map(|idx| &self.inputs[idx]);
            let text = input.map(|i| i.value().to_string()).unwrap_or_default();
            if focused {
              format!("{}_", text)
            } else if text.is_empty() {
              "-".to_string()
            } else {
              text
            }
          }
        };
        let label_style = if focused {
          Style::default().fg(Color::Cyan).bold()
        } else {
          Style::default().fg(Color::DarkGray)
        };
        Line::from(vec![
          Span::styled(format!(" {:<16}", field.label()), label_style),
          Span::raw(value),
        ])
      })
      .collect();

    lines.push(Line::raw(""));
    if let Some(error) = &self.error {
      lines.push(Line::styled(
        format!(" {}", error),
        Style::default().fg(Color::Red),
      ));
    } else {
      lines.push(Line::raw(""));
    }
    lines.push(Line::styled(
      " <enter> apply  <ctrl-r> reset  <esc> cancel",
      Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines), inner);
  }
}
