//! Errors raised while discovering runfiles or resolving a single runfile.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Every failure the locator reports to its caller.
///
/// Construction can only fail with [`RunfilesError::DiscoveryFailed`] or
/// [`RunfilesError::ManifestRead`]; resolution can only fail with
/// [`RunfilesError::InvalidArgument`] or [`RunfilesError::NotFound`].
#[derive(Debug, Error)]
pub enum RunfilesError {
  /// No environment signal applied and no `.runfiles` directory sits next to
  /// the executable.
  #[error("failed to locate runfiles for {}", display_executable(.executable.as_ref()))]
  DiscoveryFailed { executable: Option<PathBuf> },

  /// A manifest was selected but its contents could not be read.
  #[error("failed to read runfiles manifest {}: {source}", .path.display())]
  ManifestRead {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The rlocationpath handed to `resolve` is not usable as a key.
  #[error("invalid rlocationpath {path:?}: {reason}")]
  InvalidArgument { path: String, reason: &'static str },

  /// The rlocationpath is well formed but no runfile is known for it.
  #[error("runfile not found: {path}")]
  NotFound { path: String },
}

fn display_executable(executable: Option<&PathBuf>) -> String {
  executable.map_or_else(
    || "<unknown executable>".to_string(),
    |path| path.display().to_string(),
  )
}

pub type Result<T> = std::result::Result<T, RunfilesError>;
