use std::collections::HashMap;
use std::path::{Path, PathBuf};

use nom::{
  IResult, Parser,
  bytes::complete::take_till1,
  character::complete::{space0, space1},
  combinator::{rest, verify},
  sequence::preceded,
};
use tracing::{debug, trace};

use crate::error::{Result, RunfilesError};

/// Why a manifest line did not produce an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// The line has a key but nothing after it.
  MissingTarget,
  /// No key could be read from the line.
  MissingKey,
  /// The line is not valid UTF-8.
  InvalidUtf8,
}

/// A manifest line that was ignored by the permissive parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
  /// 1-based line number within the manifest.
  pub line_number: usize,
  pub reason: SkipReason,
}

/// The parsed `rlocationpath -> real path` index of a manifest file.
///
/// Built once and never mutated. Keys repeat only when the build tooling emits
/// a line twice, in which case the later line wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
  entries: HashMap<String, PathBuf>,
  skipped: Vec<SkippedLine>,
}

impl Manifest {
  /// Read and parse the manifest at `path`.
  pub fn from_file(path: &Path) -> Result<Self> {
    let contents = std::fs::read(path).map_err(|source| RunfilesError::ManifestRead {
      path: path.to_path_buf(),
      source,
    })?;
    let manifest = Self::parse_bytes(&contents);
    debug!(
      manifest = %path.display(),
      entries = manifest.len(),
      skipped = manifest.skipped.len(),
      "parsed runfiles manifest"
    );
    Ok(manifest)
  }

  /// Parse manifest text. Never fails: malformed lines are recorded in
  /// [`Manifest::skipped`] and otherwise ignored.
  pub fn parse(contents: &str) -> Self {
    Self::parse_bytes(contents.as_bytes())
  }

  /// Parse raw manifest bytes. Each line is decoded on its own, so a line
  /// that is not UTF-8 is skipped without losing the rest of the manifest.
  pub fn parse_bytes(contents: &[u8]) -> Self {
    let mut manifest = Self::default();

    for (index, line) in contents.split(|&byte| byte == b'\n').enumerate() {
      let line_number = index + 1;
      let line = line.strip_suffix(b"\r").unwrap_or(line);
      match std::str::from_utf8(line) {
        Ok(line) => manifest.add_line(line_number, line),
        Err(_) => manifest.skip(line_number, SkipReason::InvalidUtf8),
      }
    }

    manifest
  }

  fn add_line(&mut self, line_number: usize, line: &str) {
    match parse_manifest_line(line) {
      Ok((_, Line::Entry { key, target })) => {
        self.entries.insert(key.to_string(), PathBuf::from(target));
      }
      Ok((_, Line::Ignored)) => {}
      Ok((_, Line::Malformed(reason))) => self.skip(line_number, reason),
      Err(_) => self.skip(line_number, SkipReason::MissingKey),
    }
  }

  fn skip(&mut self, line_number: usize, reason: SkipReason) {
    trace!(line_number, ?reason, "skipping malformed manifest line");
    self.skipped.push(SkippedLine {
      line_number,
      reason,
    });
  }

  /// Look up the real path recorded for `key`.
  pub fn get(&self, key: &str) -> Option<&Path> {
    self.entries.get(key).map(PathBuf::as_path)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Lines the parser ignored because they did not hold two fields or were
  /// not UTF-8.
  pub fn skipped(&self) -> &[SkippedLine] {
    &self.skipped
  }

  /// Iterate over all `(rlocationpath, real path)` entries, in no particular
  /// order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
    self
      .entries
      .iter()
      .map(|(key, target)| (key.as_str(), target.as_path()))
  }
}

impl<K, V> FromIterator<(K, V)> for Manifest
where
  K: Into<String>,
  V: Into<PathBuf>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      entries: iter
        .into_iter()
        .map(|(key, target)| (key.into(), target.into()))
        .collect(),
      skipped: Vec::new(),
    }
  }
}

/// One classified manifest line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
  Entry { key: &'a str, target: &'a str },
  /// Blank lines and `#` comments.
  Ignored,
  Malformed(SkipReason),
}

/// Classify a single manifest line (without its line terminator).
///
/// Leading whitespace is ignored. The key runs up to the first space or tab;
/// the target is everything after the first run of spaces and tabs, so spaces
/// inside the target are kept.
/// Example input:
/// ```text
/// my_workspace/data/sample.txt /abs/path/to/sample file.txt
/// ```
fn parse_manifest_line(input: &str) -> IResult<&str, Line<'_>> {
  let (line, _) = skip_indent(input)?;

  if line.is_empty() || line.starts_with('#') {
    return Ok(("", Line::Ignored));
  }

  let (remaining, key) = parse_key(line)?;

  match parse_target(remaining) {
    Ok((remaining, target)) => Ok((remaining, Line::Entry { key, target })),
    Err(_) => Ok(("", Line::Malformed(SkipReason::MissingTarget))),
  }
}

fn skip_indent(input: &str) -> IResult<&str, &str> {
  space0(input)
}

/// The key: a non-empty run of anything but spaces and tabs.
fn parse_key(input: &str) -> IResult<&str, &str> {
  take_till1(|c: char| c == ' ' || c == '\t').parse(input)
}

/// The target: a separating whitespace run, then the non-empty remainder of
/// the line verbatim.
fn parse_target(input: &str) -> IResult<&str, &str> {
  preceded(space1, verify(rest, |target: &str| !target.is_empty())).parse(input)
}
