use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::{info, warn};

use crate::export::save_file;

/// How a share request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
  /// Handed to the share command
  Shared(PathBuf),
  /// Sharing was unavailable or failed; the file was saved instead
  Downloaded { path: PathBuf, reason: String },
}

impl ShareOutcome {
  pub fn path(&self) -> &Path {
    match self {
      ShareOutcome::Shared(path) => path,
      ShareOutcome::Downloaded { path, .. } => path,
    }
  }
}

/// Save `bytes` as `name` and pass the file to `share_command`.
///
/// The file is always written to `directory` first, so a missing or failing
/// share command degrades to a plain download.
pub fn share_file(
  share_command: Option<&str>,
  directory: &Path,
  name: &str,
  bytes: &[u8],
) -> Result<ShareOutcome> {
  let path = save_file(directory, name, bytes)?;

  let Some(command) = share_command.filter(|c| !c.trim().is_empty()) else {
    info!(path = %path.display(), "No share command configured, downloaded instead");
    return Ok(ShareOutcome::Downloaded {
      path,
      reason: "sharing is not available".to_string(),
    });
  };

  match run_share_command(command, &path) {
    Ok(()) => {
      info!(path = %path.display(), command, "Shared file");
      Ok(ShareOutcome::Shared(path))
    }
    Err(e) => {
      warn!(path = %path.display(), command, error = %e, "Share failed, downloaded instead");
      Ok(ShareOutcome::Downloaded {
        path,
        reason: e.to_string(),
      })
    }
  }
}

fn run_share_command(command: &str, path: &Path) -> Result<()> {
  let mut parts = command.split_whitespace();
  let program = parts
    .next()
    .ok_or_else(|| eyre!("Share command is empty"))?;

  let status = Command::new(program)
    .args(parts)
    .arg(path)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .status()
    .map_err(|e| eyre!("Failed to run '{}': {}", program, e))?;

  if status.success() {
    Ok(())
  } else {
    Err(eyre!("'{}' exited with {}", program, status))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_without_command_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = share_file(None, dir.path(), "a.jpg", b"jpeg").unwrap();
    assert!(matches!(outcome, ShareOutcome::Downloaded { .. }));
    assert!(outcome.path().exists());
  }

  #[test]
  fn test_missing_program_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = share_file(
      Some("definitely-not-a-real-share-tool"),
      dir.path(),
      "a.jpg",
      b"jpeg",
    )
    .unwrap();
    match outcome {
      ShareOutcome::Downloaded { path, reason } => {
        assert!(path.exists());
        assert!(reason.contains("definitely-not-a-real-share-tool"));
      }
      other => panic!("expected download fallback, got {:?}", other),
    }
  }

  #[cfg(unix)]
  #[test]
  fn test_successful_command_shares() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = share_file(Some("true"), dir.path(), "a.jpg", b"jpeg").unwrap();
    assert!(matches!(outcome, ShareOutcome::Shared(_)));
  }

  #[cfg(unix)]
  #[test]
  fn test_failing_command_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = share_file(Some("false"), dir.path(), "a.jpg", b"jpeg").unwrap();
    assert!(matches!(outcome, ShareOutcome::Downloaded { .. }));
  }
}
