//! Writing exports into the downloads directory.

pub mod csv;
pub mod pdf;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing::info;

use crate::directory::Employee;

pub use self::csv::to_csv;
pub use self::pdf::to_pdf;

/// Which export to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
  Csv,
  Pdf,
}

impl ExportFormat {
  pub fn file_name(&self) -> &'static str {
    match self {
      ExportFormat::Csv => "employees.csv",
      ExportFormat::Pdf => "employees.pdf",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      ExportFormat::Csv => "CSV",
      ExportFormat::Pdf => "PDF",
    }
  }
}

/// Serialize `records` and write them into `directory`, returning the path.
pub fn export_records(
  records: &[Employee],
  format: ExportFormat,
  directory: &Path,
) -> Result<PathBuf> {
  let bytes = match format {
    ExportFormat::Csv => to_csv(records)?.into_bytes(),
    ExportFormat::Pdf => to_pdf(records, Local::now())?,
  };
  let path = save_file(directory, format.file_name(), &bytes)?;
  info!(path = %path.display(), records = records.len(), "Export written");
  Ok(path)
}

/// Write `bytes` as `name` inside `directory` without clobbering an existing
/// file: `report.csv` becomes `report (1).csv`, `report (2).csv`, ...
pub fn save_file(directory: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
  fs::create_dir_all(directory)
    .wrap_err_with(|| format!("Failed to create {}", directory.display()))?;

  let name = sanitize_file_name(name);
  let path = unique_path(directory, &name);
  fs::write(&path, bytes).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}

/// Replace path separators and control characters so a display name is safe
/// as a single file name.
pub fn sanitize_file_name(name: &str) -> String {
  let cleaned: String = name
    .trim()
    .chars()
    .map(|c| match c {
      '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
      c if c.is_control() => '_',
      c => c,
    })
    .collect();
  let cleaned = cleaned.trim_start_matches('.').to_string();
  if cleaned.is_empty() {
    "download".to_string()
  } else {
    cleaned
  }
}

fn unique_path(directory: &Path, name: &str) -> PathBuf {
  let candidate = directory.join(name);
  if !candidate.exists() {
    return candidate;
  }

  let (stem, ext) = match name.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{}", ext)),
    _ => (name, String::new()),
  };
  (1..)
    .map(|n| directory.join(format!("{} ({}){}", stem, n, ext)))
    .find(|p| !p.exists())
    .unwrap_or(candidate)
}
