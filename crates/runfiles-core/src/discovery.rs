use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::environment::{Environment, RUNFILES_DIR, RUNFILES_MANIFEST_FILE, TEST_SRCDIR};
use crate::error::{Result, RunfilesError};
use crate::manifest::Manifest;

/// Name of the manifest a `.runfiles` directory may carry instead of (or next
/// to) a mirrored tree.
pub const MANIFEST_FILE_NAME: &str = "MANIFEST";

const RUNFILES_SUFFIX: &str = ".runfiles";

/// How runfiles are looked up, fixed when the locator is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  /// A real directory tree where `root/<rlocationpath>` is the runfile.
  Directory(PathBuf),
  /// An index of `rlocationpath -> real path`, parsed from `path`.
  Manifest { path: PathBuf, manifest: Manifest },
}

/// Which discovery signal selected the [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
  /// `RUNFILES_MANIFEST_FILE`
  ManifestFileVar,
  /// `RUNFILES_DIR`
  RunfilesDirVar,
  /// `TEST_SRCDIR`
  TestSrcdirVar,
  /// `MANIFEST` inside `<exe>.runfiles/`
  AdjacentManifest,
  /// `<exe>.runfiles/` itself
  AdjacentDirectory,
  /// Built directly from a known directory or manifest, without discovery
  Explicit,
}

impl Source {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::ManifestFileVar => RUNFILES_MANIFEST_FILE,
      Self::RunfilesDirVar => RUNFILES_DIR,
      Self::TestSrcdirVar => TEST_SRCDIR,
      Self::AdjacentManifest => "adjacent-manifest",
      Self::AdjacentDirectory => "adjacent-directory",
      Self::Explicit => "explicit",
    }
  }
}

impl fmt::Display for Source {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Pick a runfiles mode from `env`, first applicable signal wins:
///
/// 1. `RUNFILES_MANIFEST_FILE` naming an existing file
/// 2. `RUNFILES_DIR` naming an existing directory
/// 3. `TEST_SRCDIR` naming an existing directory
/// 4. `<exe dir>/<exe name>.runfiles/`, through its `MANIFEST` if present
///
/// Empty variables count as unset. A variable naming something that does not
/// exist is skipped, not an error.
pub(crate) fn discover(env: &Environment) -> Result<(Mode, Source)> {
  if let Some(manifest_path) = env.path_var(RUNFILES_MANIFEST_FILE) {
    if manifest_path.is_file() {
      return manifest_mode(manifest_path, Source::ManifestFileVar);
    }
    debug!(
      manifest = %manifest_path.display(),
      "{RUNFILES_MANIFEST_FILE} does not name a file, ignoring it"
    );
  }

  for (name, source) in [
    (RUNFILES_DIR, Source::RunfilesDirVar),
    (TEST_SRCDIR, Source::TestSrcdirVar),
  ] {
    if let Some(dir) = env.path_var(name) {
      if dir.is_dir() {
        return Ok(directory_mode(dir, source));
      }
      debug!(dir = %dir.display(), "{name} does not name a directory, ignoring it");
    }
  }

  if let Some(executable) = env.executable() {
    if let Some(runfiles_dir) = adjacent_runfiles_dir(executable).filter(|dir| dir.is_dir()) {
      let manifest_path = runfiles_dir.join(MANIFEST_FILE_NAME);
      if manifest_path.is_file() {
        return manifest_mode(&manifest_path, Source::AdjacentManifest);
      }
      return Ok(directory_mode(&runfiles_dir, Source::AdjacentDirectory));
    }
  }

  Err(RunfilesError::DiscoveryFailed {
    executable: env.executable().map(Path::to_path_buf),
  })
}

fn manifest_mode(path: &Path, source: Source) -> Result<(Mode, Source)> {
  let manifest = Manifest::from_file(path)?;
  debug!(%source, manifest = %path.display(), "using manifest based runfiles");
  Ok((
    Mode::Manifest {
      path: path.to_path_buf(),
      manifest,
    },
    source,
  ))
}

fn directory_mode(root: &Path, source: Source) -> (Mode, Source) {
  debug!(%source, root = %root.display(), "using directory based runfiles");
  (Mode::Directory(root.to_path_buf()), source)
}

/// `<exe dir>/<exe file name>.runfiles`, or `None` if the executable path has
/// no file name.
pub fn adjacent_runfiles_dir(executable: &Path) -> Option<PathBuf> {
  let mut runfiles_name: OsString = executable.file_name()?.to_owned();
  runfiles_name.push(RUNFILES_SUFFIX);
  Some(executable.with_file_name(runfiles_name))
}
