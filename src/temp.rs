//! Scoped temporary files and directories
//!
//! Each guard creates its resource under the system's temporary-files area on
//! construction and removes it when dropped, along every exit path. Given a
//! preferred name, the guard first tries to claim exactly that name; if it is
//! already taken, a uniquely suffixed name with the same prefix is used
//! instead. Call [`TempFile::keep`] or [`TempDir::keep`] to deliberately
//! leave the resource behind for inspection.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;

use anyhow::{anyhow, ensure, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::assertion::assert_path_is_file;
use crate::copy::{copy_children, CopyOptions};

/// A temporary file removed from disk when the guard is dropped
#[derive(Debug)]
pub struct TempFile {
    path: Utf8PathBuf,
    cleanup: bool,
}

/// A temporary directory removed recursively when the guard is dropped
#[derive(Debug)]
pub struct TempDir {
    path: Utf8PathBuf,
    cleanup: bool,
}

impl TempFile {
    /// Creates an empty temporary file, preferring exactly the given name
    pub fn create(preferred_name: &str) -> Result<TempFile> {
        let path = create_temp_file_path(preferred_name)?;
        debug!("created temp file {path}");
        Ok(TempFile {
            path,
            cleanup: true,
        })
    }

    /// Creates a temporary copy of the given file's content
    ///
    /// The preferred name defaults to the file's own name.
    pub fn create_for(
        file: impl AsRef<Utf8Path>,
        adapted_preferred_name: Option<&str>,
    ) -> Result<TempFile> {
        let file = file.as_ref();
        assert_path_is_file(file)?;
        let preferred_name = match adapted_preferred_name {
            Some(name) => name,
            None => file
                .file_name()
                .ok_or_else(|| anyhow!("The path {file} has no file name"))?,
        };
        let temp_file = TempFile::create(preferred_name)?;
        fs::copy(file, temp_file.path())
            .with_context(|| format!("Copying {file} to {}", temp_file.path()))?;
        Ok(temp_file)
    }

    /// The absolute path of the temporary file
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Disarms cleanup, leaving the file behind, and returns its path
    pub fn keep(mut self) -> Utf8PathBuf {
        self.cleanup = false;
        self.path.clone()
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.cleanup && self.path.is_file() {
            debug!("removing temp file {}", self.path);
            if let Err(error) = fs::remove_file(&self.path) {
                warn!("Failed to remove temp file {}: {error}", self.path);
            }
        }
    }
}

impl TempDir {
    /// Creates an empty temporary directory, preferring exactly the given
    /// name
    pub fn create(preferred_name: &str) -> Result<TempDir> {
        let path = create_temp_dir_path(preferred_name)?;
        debug!("created temp directory {path}");
        Ok(TempDir {
            path,
            cleanup: true,
        })
    }

    /// Creates a temporary directory containing a copy of the given
    /// directory's children
    ///
    /// The preferred name defaults to the directory's own name. The children
    /// are copied with default [`CopyOptions`]; the fresh directory is empty,
    /// so no conflicts can arise.
    pub fn create_for(
        directory: impl AsRef<Utf8Path>,
        adapted_preferred_name: Option<&str>,
    ) -> Result<TempDir> {
        let directory = directory.as_ref();
        ensure!(
            directory.is_dir(),
            "The path {directory} does not exist or is no directory"
        );
        let preferred_name = match adapted_preferred_name {
            Some(name) => name,
            None => directory
                .file_name()
                .ok_or_else(|| anyhow!("The path {directory} has no directory name"))?,
        };
        let temp_directory = TempDir::create(preferred_name)?;
        copy_children(directory, temp_directory.path(), CopyOptions::default())
            .with_context(|| format!("Copying {directory} to {}", temp_directory.path()))?;
        Ok(temp_directory)
    }

    /// The absolute path of the temporary directory
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Disarms cleanup, leaving the directory behind, and returns its path
    pub fn keep(mut self) -> Utf8PathBuf {
        self.cleanup = false;
        self.path.clone()
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        if self.cleanup && self.path.is_dir() {
            debug!("removing temp directory {}", self.path);
            if let Err(error) = fs::remove_dir_all(&self.path) {
                warn!("Failed to remove temp directory {}: {error}", self.path);
            }
        }
    }
}

fn system_temp_directory() -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(std::env::temp_dir()).map_err(|path| {
        anyhow!(
            "The system temporary directory {} is not valid UTF-8",
            path.display()
        )
    })
}

fn create_temp_file_path(preferred_name: &str) -> Result<Utf8PathBuf> {
    let path = system_temp_directory()?.join(preferred_name);
    // create_new makes the exists-check and the claim one atomic step
    match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(_) => Ok(path),
        Err(error) if error.kind() == ErrorKind::AlreadyExists => {
            let (_file, fallback) = tempfile::Builder::new()
                .prefix(preferred_name)
                .tempfile()
                .with_context(|| format!("Creating temp file with prefix {preferred_name}"))?
                .keep()
                .map_err(|error| error.error)
                .with_context(|| format!("Keeping temp file with prefix {preferred_name}"))?;
            Utf8PathBuf::from_path_buf(fallback)
                .map_err(|path| anyhow!("Temporary path {} is not valid UTF-8", path.display()))
        }
        Err(error) => Err(error).with_context(|| format!("Creating temp file {path}")),
    }
}

fn create_temp_dir_path(preferred_name: &str) -> Result<Utf8PathBuf> {
    let path = system_temp_directory()?.join(preferred_name);
    match fs::create_dir(&path) {
        Ok(()) => Ok(path),
        Err(error) if error.kind() == ErrorKind::AlreadyExists => {
            let fallback = tempfile::Builder::new()
                .prefix(preferred_name)
                .tempdir()
                .with_context(|| format!("Creating temp directory with prefix {preferred_name}"))?
                .keep();
            Utf8PathBuf::from_path_buf(fallback)
                .map_err(|path| anyhow!("Temporary path {} is not valid UTF-8", path.display()))
        }
        Err(error) => Err(error).with_context(|| format!("Creating temp directory {path}")),
    }
}
