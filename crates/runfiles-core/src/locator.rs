use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::discovery::{Mode, Source, discover};
use crate::environment::Environment;
use crate::error::{Result, RunfilesError};
use crate::manifest::Manifest;
use crate::rlocation::RlocationPath;

/// Resolves rlocationpaths to real paths for the running executable.
///
/// A `Locator` is built once, then shared freely: it is immutable, holds no
/// open handles, and `resolve` may be called from many threads at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
  mode: Mode,
  source: Source,
}

impl Locator {
  /// Discover runfiles from the environment of the current process.
  pub fn create() -> Result<Self> {
    Self::from_environment(&Environment::from_process())
  }

  /// Discover runfiles from an explicit environment snapshot.
  pub fn from_environment(env: &Environment) -> Result<Self> {
    let (mode, source) = discover(env)?;
    Ok(Self { mode, source })
  }

  /// A directory based locator rooted at `root`, skipping discovery.
  pub fn from_directory(root: impl Into<PathBuf>) -> Self {
    Self {
      mode: Mode::Directory(root.into()),
      source: Source::Explicit,
    }
  }

  /// A manifest based locator reading `path`, skipping discovery.
  pub fn from_manifest_file(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let manifest = Manifest::from_file(&path)?;
    Ok(Self {
      mode: Mode::Manifest { path, manifest },
      source: Source::Explicit,
    })
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  /// The discovery signal that selected this locator's mode.
  pub fn source(&self) -> Source {
    self.source
  }

  /// The runfiles root in directory mode.
  pub fn runfiles_dir(&self) -> Option<&Path> {
    match &self.mode {
      Mode::Directory(root) => Some(root.as_path()),
      Mode::Manifest { .. } => None,
    }
  }

  /// The manifest path in manifest mode.
  pub fn manifest_path(&self) -> Option<&Path> {
    match &self.mode {
      Mode::Directory(_) => None,
      Mode::Manifest { path, .. } => Some(path.as_path()),
    }
  }

  /// Resolve `rlocationpath` to a real path.
  ///
  /// In directory mode the joined path must exist on disk. In manifest mode
  /// the recorded path is returned as-is.
  ///
  /// # Errors
  ///
  /// [`RunfilesError::InvalidArgument`] for an empty, absolute, or otherwise
  /// malformed key; [`RunfilesError::NotFound`] when no runfile is known.
  pub fn resolve(&self, rlocationpath: &str) -> Result<PathBuf> {
    let key = RlocationPath::new(rlocationpath)?;

    let resolved = match &self.mode {
      Mode::Directory(root) => {
        let candidate = key.join_onto(root);
        // a failed existence check counts as a miss
        candidate
          .try_exists()
          .unwrap_or(false)
          .then_some(candidate)
      }
      Mode::Manifest { manifest, .. } => manifest.get(key.as_str()).map(Path::to_path_buf),
    };

    match resolved {
      Some(path) => {
        trace!(rlocationpath = %key, path = %path.display(), "resolved runfile");
        Ok(path)
      }
      None => {
        debug!(
          rlocationpath = %key,
          repository = key.repository(),
          source = %self.source,
          "runfile not found"
        );
        Err(RunfilesError::NotFound {
          path: key.as_str().to_string(),
        })
      }
    }
  }
}
