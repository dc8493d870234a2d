#![deny(clippy::all)]
//! End-to-end tests for the runfiles locator
//!
//! This crate provides a throwaway on-disk sandbox for building runfiles
//! layouts (directory trees, manifests, fake executables) and the tests that
//! drive discovery and resolution through them.

use std::fs;
use std::path::{Path, PathBuf};

use runfiles_core::environment::{Environment, RUNFILES_DIR, RUNFILES_MANIFEST_FILE, TEST_SRCDIR};
use tempfile::TempDir;

/// The rlocationpath every sandbox layout stages by default.
pub const TEST_DATA_KEY: &str = "runfiles_api/test_data.txt";
/// Contents of the default runfile.
pub const TEST_DATA_CONTENT: &str = "Test data content";

/// Path to the repo level `fixtures/` directory
pub fn fixtures_dir() -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .parent()
    .unwrap()
    .parent()
    .unwrap()
    .join("fixtures")
}

/// Load a fixture file from the fixtures directory
pub fn load_fixture(filename: &str) -> String {
  load_fixture_from_path(&fixtures_dir().join(filename))
}

/// Load a fixture file from a path
pub fn load_fixture_from_path(fixture_path: &Path) -> String {
  fs::read_to_string(fixture_path).unwrap_or_else(|e| {
    panic!(
      "Failed to read fixture file {}: {}",
      fixture_path.display(),
      e
    )
  })
}

/// A temporary directory to lay out runfiles in. Removed on drop.
///
/// Every helper panics on I/O failure, which is what a test wants.
pub struct Sandbox {
  root: TempDir,
}

impl Default for Sandbox {
  fn default() -> Self {
    Self::new()
  }
}

impl Sandbox {
  pub fn new() -> Self {
    Self {
      root: tempfile::tempdir().expect("failed to create sandbox directory"),
    }
  }

  pub fn path(&self) -> &Path {
    self.root.path()
  }

  /// Write `contents` to `relative` (creating parent directories) and return
  /// the absolute path.
  pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
    let path = self.path().join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)
        .unwrap_or_else(|e| panic!("Failed to create {}: {e}", parent.display()));
    }
    fs::write(&path, contents).unwrap_or_else(|e| panic!("Failed to write {}: {e}", path.display()));
    path
  }

  /// Create an empty directory at `relative` and return its absolute path.
  pub fn create_dir(&self, relative: &str) -> PathBuf {
    let path = self.path().join(relative);
    fs::create_dir_all(&path).unwrap_or_else(|e| panic!("Failed to create {}: {e}", path.display()));
    path
  }

  /// A placeholder executable at `bin/<name>`. Discovery only looks at its
  /// path, so the file is empty.
  pub fn executable(&self, name: &str) -> PathBuf {
    self.write_file(&format!("bin/{name}"), "")
  }

  /// A runfiles tree at `relative` holding [`TEST_DATA_KEY`].
  pub fn runfiles_tree(&self, relative: &str) -> PathBuf {
    let root = self.create_dir(relative);
    self.write_file(&format!("{relative}/{TEST_DATA_KEY}"), TEST_DATA_CONTENT);
    root
  }

  /// The `<exe>.runfiles` directory next to `executable`, holding
  /// [`TEST_DATA_KEY`] as a real file.
  pub fn adjacent_tree(&self, executable: &Path) -> PathBuf {
    let dir = adjacent_dir(executable);
    let test_file = dir.join(TEST_DATA_KEY);
    fs::create_dir_all(test_file.parent().unwrap()).unwrap();
    fs::write(&test_file, TEST_DATA_CONTENT).unwrap();
    dir
  }

  /// The `<exe>.runfiles` directory next to `executable` holding only a
  /// `MANIFEST` that maps [`TEST_DATA_KEY`] to a file stored under `data/`.
  pub fn adjacent_manifest(&self, executable: &Path) -> PathBuf {
    let dir = adjacent_dir(executable);
    fs::create_dir_all(&dir).unwrap();
    let target = self.write_file("data/test_data.txt", TEST_DATA_CONTENT);
    let manifest = dir.join("MANIFEST");
    fs::write(&manifest, format!("{TEST_DATA_KEY} {}\n", target.display())).unwrap();
    manifest
  }

  /// A manifest at `relative` with one line per entry.
  pub fn manifest(&self, relative: &str, entries: &[(&str, &Path)]) -> PathBuf {
    let contents: String = entries
      .iter()
      .map(|(key, target)| format!("{key} {}\n", target.display()))
      .collect();
    self.write_file(relative, &contents)
  }

  /// A manifest at `relative` mapping [`TEST_DATA_KEY`] to a file stored
  /// under `data/`.
  pub fn data_manifest(&self, relative: &str) -> PathBuf {
    let target = self.write_file("data/test_data.txt", TEST_DATA_CONTENT);
    self.manifest(relative, &[(TEST_DATA_KEY, target.as_path())])
  }

  /// A path at `relative` that is a regular file but fails to read, even for
  /// root: a symlink to `/proc/self/mem`, whose offset 0 is never mapped.
  #[cfg(target_os = "linux")]
  pub fn unreadable_file(&self, relative: &str) -> PathBuf {
    let path = self.path().join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)
        .unwrap_or_else(|e| panic!("Failed to create {}: {e}", parent.display()));
    }
    std::os::unix::fs::symlink("/proc/self/mem", &path)
      .unwrap_or_else(|e| panic!("Failed to link {}: {e}", path.display()));
    assert!(path.is_file() && fs::read(&path).is_err());
    path
  }
}

/// Which signals a test turns on, see [`Signals::environment`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Signals {
  pub manifest_file: bool,
  pub runfiles_dir: bool,
  pub test_srcdir: bool,
  pub adjacent_tree: bool,
  pub adjacent_manifest: bool,
}

impl Signals {
  /// Stage every requested signal inside `sandbox` and return the environment
  /// that points at them, with the sandbox executable set.
  pub fn environment(self, sandbox: &Sandbox) -> Environment {
    let executable = sandbox.executable("runfiles_user");
    let mut env = Environment::new().with_executable(&executable);

    if self.manifest_file {
      env = env.with_var(RUNFILES_MANIFEST_FILE, sandbox.data_manifest("env/MANIFEST"));
    }
    if self.runfiles_dir {
      env = env.with_var(RUNFILES_DIR, sandbox.runfiles_tree("env/runfiles_dir"));
    }
    if self.test_srcdir {
      env = env.with_var(TEST_SRCDIR, sandbox.runfiles_tree("env/test_srcdir"));
    }
    if self.adjacent_tree {
      sandbox.adjacent_tree(&executable);
    }
    if self.adjacent_manifest {
      sandbox.adjacent_manifest(&executable);
    }
    env
  }
}

fn adjacent_dir(executable: &Path) -> PathBuf {
  runfiles_core::discovery::adjacent_runfiles_dir(executable).expect("executable has a file name")
}
