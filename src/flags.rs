//! Querying and toggling the executable permission bit

use std::fs;
use std::os::unix::fs::PermissionsExt;

use anyhow::{Context, Result};
use camino::Utf8Path;
use nix::unistd::{access, AccessFlags};
use tracing::debug;

use crate::assertion::assert_path_is_file;

/// Returns true if the current process may execute the given file
pub fn is_executable(path: impl AsRef<Utf8Path>) -> bool {
    access(path.as_ref().as_std_path(), AccessFlags::X_OK).is_ok()
}

/// Sets the owner-execute bit on the given file unless it is already
/// executable
///
/// Idempotent. Fails with a not-found error if the path is not an existing
/// regular file.
pub fn make_executable_if_necessary(file: impl AsRef<Utf8Path>) -> Result<()> {
    let file = file.as_ref();
    assert_path_is_file(file)?;
    if !is_executable(file) {
        let mut permissions = fs::metadata(file)
            .with_context(|| format!("Reading permissions of {file}"))?
            .permissions();
        debug!("Making file {file} executable");
        permissions.set_mode(permissions.mode() | 0o100);
        fs::set_permissions(file, permissions)
            .with_context(|| format!("Making {file} executable"))?;
    }
    Ok(())
}
