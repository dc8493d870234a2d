use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, RunfilesError};

/// A workspace-relative key for a runfile, e.g. `my_workspace/data/sample.txt`.
///
/// The key is opaque: it is never normalised, so `a/./b` and `a/b` are
/// different keys, and matching is case and separator sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RlocationPath<'a>(&'a str);

impl<'a> RlocationPath<'a> {
  /// Validate a caller supplied key.
  ///
  /// Empty keys, keys holding a NUL byte, and absolute paths are rejected with
  /// [`RunfilesError::InvalidArgument`].
  pub fn new(path: &'a str) -> Result<Self> {
    let reason = if path.is_empty() {
      Some("rlocationpath must not be empty")
    } else if path.contains('\0') {
      Some("rlocationpath must not contain NUL bytes")
    } else if path.starts_with('/') || Path::new(path).has_root() || has_windows_prefix(path) {
      Some("rlocationpath must be relative")
    } else {
      None
    };

    match reason {
      Some(reason) => Err(RunfilesError::InvalidArgument {
        path: path.to_string(),
        reason,
      }),
      None => Ok(Self(path)),
    }
  }

  pub fn as_str(&self) -> &'a str {
    self.0
  }

  /// The leading repository segment (`my_workspace` for
  /// `my_workspace/data/sample.txt`).
  pub fn repository(&self) -> &'a str {
    self.0.split_once('/').map_or(self.0, |(repo, _)| repo)
  }

  /// Join the key onto a runfiles root, one segment at a time so the host
  /// separator is used.
  pub(crate) fn join_onto(&self, root: &Path) -> PathBuf {
    let mut joined = root.to_path_buf();
    for segment in self.0.split('/') {
      joined.push(segment);
    }
    joined
  }
}

impl fmt::Display for RlocationPath<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.0)
  }
}

impl AsRef<str> for RlocationPath<'_> {
  fn as_ref(&self) -> &str {
    self.0
  }
}

// `C:foo` and `C:\foo` both carry a prefix on Windows, which would replace the
// root when joined.
fn has_windows_prefix(path: &str) -> bool {
  matches!(
    Path::new(path).components().next(),
    Some(Component::Prefix(_))
  )
}
