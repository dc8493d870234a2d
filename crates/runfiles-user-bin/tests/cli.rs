//! Runs the `runfiles-user` binary with controlled environments and
//! directory layouts, the way a build system would launch it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use runfiles_test::{Sandbox, TEST_DATA_CONTENT, TEST_DATA_KEY};

/// Copy the binary into its own directory inside `sandbox` so adjacent
/// `.runfiles` lookups only see what the test creates.
fn binary_under_test(sandbox: &Sandbox) -> PathBuf {
  let original = Path::new(env!("CARGO_BIN_EXE_runfiles-user"));
  let dir = sandbox.create_dir("binary");
  let copy = dir.join(original.file_name().unwrap());
  fs::copy(original, &copy).unwrap();
  copy
}

fn run(binary: &Path, args: &[&str], env: &[(&str, &Path)]) -> Output {
  let mut command = Command::new(binary);
  command.args(args).env_clear();
  for (name, value) in env {
    command.env(name, value);
  }

  // A sibling test forking while our copy was still open for writing makes
  // exec fail with ETXTBSY until that child execs.
  let mut attempts = 0;
  loop {
    match command.output() {
      Err(e) if e.kind() == std::io::ErrorKind::ExecutableFileBusy && attempts < 10 => {
        attempts += 1;
        std::thread::sleep(std::time::Duration::from_millis(50));
      }
      result => return result.unwrap(),
    }
  }
}

fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_no_runfiles() {
  let sandbox = Sandbox::new();
  let binary = binary_under_test(&sandbox);

  let output = run(&binary, &[TEST_DATA_KEY], &[]);
  assert!(
    !output.status.success(),
    "Binary should fail when no runfiles are available"
  );
  assert!(stderr(&output).contains("Failed to locate runfiles"));
}

#[test]
fn test_runfiles_dir_env() {
  let sandbox = Sandbox::new();
  let binary = binary_under_test(&sandbox);
  let runfiles_dir = sandbox.runfiles_tree("runfiles");

  let output = run(&binary, &[TEST_DATA_KEY], &[("RUNFILES_DIR", runfiles_dir.as_path())]);
  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(stdout(&output), TEST_DATA_CONTENT);
}

#[test]
fn test_test_srcdir_env() {
  let sandbox = Sandbox::new();
  let binary = binary_under_test(&sandbox);
  let srcdir = sandbox.runfiles_tree("srcdir");

  let output = run(&binary, &[TEST_DATA_KEY], &[("TEST_SRCDIR", srcdir.as_path())]);
  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(stdout(&output), TEST_DATA_CONTENT);
}

#[test]
fn test_runfiles_manifest_env() {
  let sandbox = Sandbox::new();
  let binary = binary_under_test(&sandbox);
  let manifest = sandbox.data_manifest("MANIFEST");

  let output = run(
    &binary,
    &[TEST_DATA_KEY],
    &[("RUNFILES_MANIFEST_FILE", manifest.as_path())],
  );
  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(stdout(&output), TEST_DATA_CONTENT);
}

#[test]
fn test_runfiles_dir_no_manifest() {
  let sandbox = Sandbox::new();
  let binary = binary_under_test(&sandbox);
  sandbox.adjacent_tree(&binary);

  let output = run(&binary, &[TEST_DATA_KEY], &[]);
  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(stdout(&output), TEST_DATA_CONTENT);
}

#[test]
fn test_runfiles_dir_with_manifest() {
  let sandbox = Sandbox::new();
  let binary = binary_under_test(&sandbox);
  sandbox.adjacent_manifest(&binary);

  let output = run(&binary, &[TEST_DATA_KEY], &[]);
  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(stdout(&output), TEST_DATA_CONTENT);
}

#[test]
fn test_runfiles_dir_empty_manifest_env() {
  let sandbox = Sandbox::new();
  let binary = binary_under_test(&sandbox);
  sandbox.adjacent_manifest(&binary);

  let output = run(
    &binary,
    &[TEST_DATA_KEY],
    &[("RUNFILES_MANIFEST_FILE", Path::new(""))],
  );
  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(stdout(&output), TEST_DATA_CONTENT);
}

#[test]
fn test_unknown_runfile() {
  let sandbox = Sandbox::new();
  let binary = binary_under_test(&sandbox);
  let runfiles_dir = sandbox.runfiles_tree("runfiles");

  let output = run(
    &binary,
    &["runfiles_api/missing.txt"],
    &[("RUNFILES_DIR", runfiles_dir.as_path())],
  );
  assert!(!output.status.success());
  assert!(
    stderr(&output).contains("Failed to locate runfile: runfiles_api/missing.txt"),
    "{}",
    stderr(&output)
  );
  assert!(stdout(&output).is_empty());
}

#[test]
fn test_print_path() {
  let sandbox = Sandbox::new();
  let binary = binary_under_test(&sandbox);
  let runfiles_dir = sandbox.runfiles_tree("runfiles");

  let output = run(
    &binary,
    &["--print-path", TEST_DATA_KEY],
    &[("RUNFILES_DIR", runfiles_dir.as_path())],
  );
  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(
    PathBuf::from(stdout(&output).trim_end()),
    runfiles_dir.join("runfiles_api").join("test_data.txt")
  );
}

#[test]
fn test_dump_json() {
  let sandbox = Sandbox::new();
  let binary = binary_under_test(&sandbox);
  let manifest = sandbox.data_manifest("MANIFEST");

  let output = run(
    &binary,
    &["--dump", "--json"],
    &[("RUNFILES_MANIFEST_FILE", manifest.as_path())],
  );
  assert!(output.status.success(), "{}", stderr(&output));

  let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
  assert_eq!(report["source"], "RUNFILES_MANIFEST_FILE");
  assert_eq!(report["mode"], "manifest");
  assert_eq!(report["entries"], 1);
}

#[test]
fn test_missing_argument_is_usage_error() {
  let sandbox = Sandbox::new();
  let binary = binary_under_test(&sandbox);

  let output = run(&binary, &[], &[]);
  assert_eq!(output.status.code(), Some(2));
}
