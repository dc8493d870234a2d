//! The inputs discovery runs on.
//!
//! Discovery never touches the live process environment. Callers build an
//! [`Environment`] (or snapshot the real one with
//! [`Environment::from_process`]) and hand it to
//! [`Locator::from_environment`](crate::Locator::from_environment).

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Path to a manifest file mapping rlocationpaths to real paths.
pub const RUNFILES_MANIFEST_FILE: &str = "RUNFILES_MANIFEST_FILE";
/// Path to a directory tree mirroring rlocationpaths.
pub const RUNFILES_DIR: &str = "RUNFILES_DIR";
/// Test-runner spelling of [`RUNFILES_DIR`].
pub const TEST_SRCDIR: &str = "TEST_SRCDIR";

/// Every variable discovery reads, highest precedence first.
pub const DISCOVERY_VARS: [&str; 3] = [RUNFILES_MANIFEST_FILE, RUNFILES_DIR, TEST_SRCDIR];

/// A snapshot of environment variables plus the path of the running
/// executable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
  vars: BTreeMap<String, OsString>,
  executable: Option<PathBuf>,
}

impl Environment {
  /// An empty snapshot: no variables, no executable.
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot the discovery variables and the executable path of the current
  /// process.
  ///
  /// The executable comes from [`std::env::current_exe`], falling back to
  /// `argv[0]` when the platform cannot report it.
  pub fn from_process() -> Self {
    let vars = DISCOVERY_VARS
      .iter()
      .filter_map(|name| std::env::var_os(name).map(|value| ((*name).to_string(), value)))
      .collect();

    let executable = std::env::current_exe()
      .ok()
      .or_else(|| std::env::args_os().next().map(PathBuf::from));

    Self { vars, executable }
  }

  #[must_use]
  pub fn with_var(mut self, name: impl Into<String>, value: impl Into<OsString>) -> Self {
    self.vars.insert(name.into(), value.into());
    self
  }

  #[must_use]
  pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
    self.executable = Some(executable.into());
    self
  }

  /// The raw value of `name`, including an empty value.
  pub fn var(&self, name: &str) -> Option<&OsStr> {
    self.vars.get(name).map(OsString::as_os_str)
  }

  /// The value of `name` as a path, treating an empty value as unset.
  pub fn path_var(&self, name: &str) -> Option<&Path> {
    self
      .var(name)
      .filter(|value| !value.is_empty())
      .map(Path::new)
  }

  pub fn executable(&self) -> Option<&Path> {
    self.executable.as_deref()
  }
}
