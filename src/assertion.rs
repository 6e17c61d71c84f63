//! User-friendly assertions about paths
//!
//! These guard caller contracts: a failure means the caller handed over a
//! path that does not satisfy the stated precondition.

use anyhow::{bail, Result};
use camino::Utf8Path;

/// Fails with a not-found error unless the path exists
pub fn assert_path_exists(path: impl AsRef<Utf8Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        bail!("The path {path} does not exist");
    }
    Ok(())
}

/// Fails unless the path exists and is a regular file
pub fn assert_path_is_file(path: impl AsRef<Utf8Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        bail!("The path {path} does not exist but must be a file");
    }
    if !path.is_file() {
        bail!("The path {path} exists but must be a file");
    }
    Ok(())
}
