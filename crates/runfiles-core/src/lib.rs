//! # Runfiles
//!
//! Locate the data dependencies ("runfiles") of a build-produced executable at
//! run time. Runfiles are addressed by an rlocationpath such as
//! `my_workspace/path/to/data.txt` and are staged either as a real directory
//! tree or indexed by a `MANIFEST` file.
//!
//! ```no_run
//! use runfiles_core::Locator;
//!
//! let locator = Locator::create()?;
//! let path = locator.resolve("my_workspace/path/to/data.txt")?;
//! let contents = std::fs::read_to_string(path)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![deny(clippy::all)]
pub mod discovery;
pub mod environment;
pub mod error;
pub mod locator;
pub mod manifest;
pub mod rlocation;

use std::sync::OnceLock;

pub use discovery::{Mode, Source};
pub use environment::Environment;
pub use error::{Result, RunfilesError};
pub use locator::Locator;
pub use manifest::Manifest;
pub use rlocation::RlocationPath;

/// A process-wide locator, discovered from the process environment on first
/// use. Later calls return the same outcome, including a failed discovery.
pub fn global() -> std::result::Result<&'static Locator, &'static RunfilesError> {
  static GLOBAL: OnceLock<Result<Locator>> = OnceLock::new();
  GLOBAL.get_or_init(Locator::create).as_ref()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_global_is_initialised_once() {
    match (global(), global()) {
      (Ok(first), Ok(second)) => assert!(std::ptr::eq(first, second)),
      (Err(first), Err(second)) => assert!(std::ptr::eq(first, second)),
      _ => panic!("global() changed outcome between calls"),
    }
  }
}
