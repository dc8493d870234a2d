use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "src-merger")]
#[command(about = "Embed the runfiles library source into another source file")]
struct Args {
  /// The runfiles source file.
  #[arg(long, value_name = "FILE")]
  runfiles: PathBuf,

  /// The source file to embed into.
  #[arg(long, value_name = "FILE")]
  src: PathBuf,

  /// The text in `--src` to replace with the runfiles source.
  #[arg(long, value_parser = NonEmptyStringValueParser::new())]
  template: String,

  /// The output file.
  #[arg(long, value_name = "FILE")]
  output: PathBuf,
}

fn read(path: &Path) -> Result<String> {
  std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Replace every occurrence of `template` in `content` with `runfiles`,
/// returning the merged text and how many occurrences were replaced.
/// `template` is never empty, `Args` rejects that.
fn merge(content: &str, template: &str, runfiles: &str) -> (String, usize) {
  let count = content.matches(template).count();
  (content.replace(template, runfiles), count)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let runfiles = read(&args.runfiles)?;
  let content = read(&args.src)?;

  let (merged, count) = merge(&content, &args.template, &runfiles);
  if count == 0 {
    warn!(
      src = %args.src.display(),
      template = %args.template,
      "template not found, writing source unchanged"
    );
  }
  debug!(count, output = %args.output.display(), "merged runfiles source");

  std::fs::write(&args.output, merged)
    .with_context(|| format!("Failed to write {}", args.output.display()))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_merge_replaces_every_occurrence() {
    let (merged, count) = merge("a\n# RUNFILES\nb\n# RUNFILES\n", "# RUNFILES", "def f(): pass");
    assert_eq!(merged, "a\ndef f(): pass\nb\ndef f(): pass\n");
    assert_eq!(count, 2);
  }

  #[test]
  fn test_merge_without_template() {
    let (merged, count) = merge("unchanged", "{{RUNFILES}}", "x");
    assert_eq!(merged, "unchanged");
    assert_eq!(count, 0);
  }

  #[test]
  fn test_empty_template_is_rejected() {
    let parse = |template: &str| {
      Args::try_parse_from([
        "src-merger",
        "--runfiles",
        "runfiles.py",
        "--src",
        "main.py",
        "--template",
        template,
        "--output",
        "out.py",
      ])
    };

    let err = parse("").unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    assert_eq!(parse("# RUNFILES").unwrap().template, "# RUNFILES");
  }

  #[test]
  fn test_read_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read(&dir.path().join("missing.rs")).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read"));
  }
}
