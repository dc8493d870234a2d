use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use runfiles_core::{Locator, Mode};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "runfiles-user")]
#[command(about = "Resolve a runfile from the current environment and print its contents")]
struct Args {
  /// The runfile to locate, e.g. `workspace/path/to/file.txt`
  #[arg(value_name = "RLOCATIONPATH", required_unless_present = "dump")]
  rlocationpath: Option<String>,

  /// Print the resolved path instead of the file contents
  #[arg(long)]
  print_path: bool,

  /// Print the discovered locator instead of resolving anything
  #[arg(long)]
  dump: bool,

  /// With --dump, print a JSON summary instead of the Rust struct
  #[arg(long, requires = "dump")]
  json: bool,
}

/// JSON view of a discovered locator.
#[derive(Serialize)]
struct LocatorReport {
  source: &'static str,
  mode: &'static str,
  runfiles_dir: Option<String>,
  manifest: Option<String>,
  entries: Option<usize>,
  skipped_lines: Vec<usize>,
}

impl LocatorReport {
  fn new(locator: &Locator) -> Self {
    let source = locator.source().as_str();
    match locator.mode() {
      Mode::Directory(root) => Self {
        source,
        mode: "directory",
        runfiles_dir: Some(root.display().to_string()),
        manifest: None,
        entries: None,
        skipped_lines: Vec::new(),
      },
      Mode::Manifest { path, manifest } => Self {
        source,
        mode: "manifest",
        runfiles_dir: None,
        manifest: Some(path.display().to_string()),
        entries: Some(manifest.len()),
        skipped_lines: manifest
          .skipped()
          .iter()
          .map(|line| line.line_number)
          .collect(),
      },
    }
  }
}

fn run(args: &Args) -> Result<()> {
  let locator = Locator::create().context("Failed to locate runfiles")?;

  if let Mode::Manifest { path, manifest } = locator.mode() {
    for skipped in manifest.skipped() {
      warn!(
        manifest = %path.display(),
        line = skipped.line_number,
        reason = ?skipped.reason,
        "ignored malformed manifest line"
      );
    }
  }

  if args.dump {
    if args.json {
      println!("{}", serde_json::to_string_pretty(&LocatorReport::new(&locator))?);
    } else {
      println!("locator: {locator:#?}");
    }
    return Ok(());
  }

  let Some(rlocationpath) = args.rlocationpath.as_deref() else {
    anyhow::bail!("Provide an rlocationpath or --dump");
  };

  let path = locator
    .resolve(rlocationpath)
    .with_context(|| format!("Failed to locate runfile: {rlocationpath}"))?;

  let mut stdout = std::io::stdout().lock();
  if args.print_path {
    writeln!(stdout, "{}", path.display())?;
  } else {
    let content =
      std::fs::read(&path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    stdout.write_all(&content)?;
  }
  stdout.flush()?;
  Ok(())
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {e:#}");
      ExitCode::FAILURE
    }
  }
}
