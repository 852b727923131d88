//! Available commands and autocomplete logic

use color_eyre::eyre::eyre;
use color_eyre::Result;

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "table",
    aliases: &["t", "list"],
    description: "Employee table",
  },
  Command {
    name: "chart",
    aliases: &["c", "salaries"],
    description: "Salary bar chart",
  },
  Command {
    name: "map",
    aliases: &["m", "cities"],
    description: "Employees by city",
  },
  Command {
    name: "analytics",
    aliases: &["a", "stats"],
    description: "Department, salary and experience breakdowns",
  },
  Command {
    name: "compare",
    aliases: &["cmp", "vs"],
    description: "Compare two employees",
  },
  Command {
    name: "filter",
    aliases: &["f", "filters"],
    description: "Structured filters",
  },
  Command {
    name: "export-csv",
    aliases: &["csv"],
    description: "Save the displayed records as CSV",
  },
  Command {
    name: "export-pdf",
    aliases: &["pdf"],
    description: "Save the displayed records as PDF",
  },
  Command {
    name: "refresh",
    aliases: &["r", "reload"],
    description: "Refetch employees",
  },
  Command {
    name: "employee",
    aliases: &["e", "emp"],
    description: "Open an employee: employee <id>",
  },
  Command {
    name: "logout",
    aliases: &["signout"],
    description: "Log out and clear local data",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit staffdir",
  },
];

/// A parsed command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
  Table,
  Chart,
  Map,
  Analytics,
  Compare,
  Filter,
  ExportCsv,
  ExportPdf,
  Refresh,
  Employee(u64),
  Logout,
  Quit,
}

impl Command {
  fn any_alias(&self, test: impl Fn(&str) -> bool) -> bool {
    self.aliases.iter().any(|alias| test(alias))
  }

  /// How well `word` matches this command, lower is better.
  /// Exact name, exact alias, name prefix, alias prefix, then substring.
  fn rank(&self, word: &str) -> Option<u8> {
    if self.name == word {
      Some(0)
    } else if self.any_alias(|a| a == word) {
      Some(1)
    } else if self.name.starts_with(word) {
      Some(2)
    } else if self.any_alias(|a| a.starts_with(word)) {
      Some(3)
    } else if self.name.contains(word) {
      Some(4)
    } else if self.any_alias(|a| a.contains(word)) {
      Some(5)
    } else {
      None
    }
  }
}

/// Commands matching the first word of `input`, best first.
/// Anything after the first word is an argument and does not affect matching.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let word = input
    .split_whitespace()
    .next()
    .unwrap_or_default()
    .to_lowercase();

  let mut ranked: Vec<(u8, &'static Command)> = COMMANDS
    .iter()
    .filter_map(|cmd| cmd.rank(&word).map(|rank| (rank, cmd)))
    .collect();
  // Stable, so ties keep table order
  ranked.sort_by_key(|(rank, _)| *rank);
  ranked.into_iter().map(|(_, cmd)| cmd).collect()
}

/// Combine a chosen suggestion with whatever arguments were typed after it
pub fn complete(input: &str, suggestion: &Command) -> String {
  let args: Vec<&str> = input.split_whitespace().skip(1).collect();
  if args.is_empty() {
    suggestion.name.to_string()
  } else {
    format!("{} {}", suggestion.name, args.join(" "))
  }
}

/// Parse a full command line (name plus arguments).
pub fn parse_command(line: &str) -> Result<CommandAction> {
  let mut words = line.split_whitespace();
  let name = words
    .next()
    .ok_or_else(|| eyre!("Empty command"))?
    .to_lowercase();
  let args: Vec<&str> = words.collect();

  let cmd = COMMANDS
    .iter()
    .find(|c| c.name == name || c.aliases.contains(&name.as_str()))
    .ok_or_else(|| eyre!("Unknown command: {}", name))?;

  let action = match cmd.name {
    "table" => CommandAction::Table,
    "chart" => CommandAction::Chart,
    "map" => CommandAction::Map,
    "analytics" => CommandAction::Analytics,
    "compare" => CommandAction::Compare,
    "filter" => CommandAction::Filter,
    "export-csv" => CommandAction::ExportCsv,
    "export-pdf" => CommandAction::ExportPdf,
    "refresh" => CommandAction::Refresh,
    "employee" => {
      let raw = args
        .first()
        .ok_or_else(|| eyre!("Usage: employee <id>"))?;
      let id = raw
        .trim_start_matches('#')
        .parse::<u64>()
        .map_err(|_| eyre!("Not an employee id: {}", raw))?;
      CommandAction::Employee(id)
    }
    "logout" => CommandAction::Logout,
    "quit" => CommandAction::Quit,
    other => return Err(eyre!("Unknown command: {}", other)),
  };

  if !args.is_empty() && !matches!(action, CommandAction::Employee(_)) {
    return Err(eyre!("{} takes no arguments", cmd.name));
  }

  Ok(action)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("chart");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "chart");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("csv");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "export-csv");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("ana");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "analytics");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("lyt");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "analytics");
  }

  #[test]
  fn test_suggestions_ignore_arguments() {
    let suggestions = get_suggestions("emp 42");
    assert_eq!(suggestions[0].name, "employee");
    assert_eq!(complete("emp 42", suggestions[0]), "employee 42");
    assert_eq!(complete("emp", suggestions[0]), "employee");
  }

  #[test]
  fn test_parse_command() {
    assert_eq!(parse_command("table").unwrap(), CommandAction::Table);
    assert_eq!(parse_command("PDF").unwrap(), CommandAction::ExportPdf);
    assert_eq!(
      parse_command("employee 17").unwrap(),
      CommandAction::Employee(17)
    );
    assert_eq!(
      parse_command("e #3").unwrap(),
      CommandAction::Employee(3)
    );
  }

  #[test]
  fn test_parse_command_errors() {
    assert!(parse_command("").is_err());
    assert!(parse_command("nope").is_err());
    assert!(parse_command("employee").is_err());
    assert!(parse_command("employee abc").is_err());
    assert!(parse_command("map now").is_err());
  }
}
