//! A recursive, policy-driven directory copier
//!
//! Entries are copied one at a time with plain blocking filesystem calls;
//! there is no parallelism and no OS-level bulk copy, so this is not built
//! for speed. There is also no rollback: when a [`CopyError`] is raised part
//! way through, everything already copied stays on disk and callers must
//! assume unknown partial progress.

use std::{fs, io};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

/// Policy for resolving collisions between source and target entries
///
/// The default merges existing target directories and refuses to overwrite
/// existing target files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyOptions {
    /// Reuse an existing target directory and merge children into it
    pub merge_directories: bool,
    /// Replace an existing target file with the source file
    pub overwrite_files: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        CopyOptions {
            merge_directories: true,
            overwrite_files: false,
        }
    }
}

/// A precondition violation or conflict encountered while copying
///
/// Every message names the involved path, or both paths where a source is
/// being copied onto a target, so callers can match on path substrings.
#[derive(Debug, Error)]
pub enum CopyError {
    /// The source of [`copy_children`] is absent
    #[error("The source directory '{0}' must exist.")]
    SourceMissing(Utf8PathBuf),
    /// The source of [`copy_children`] exists but is not a directory
    #[error("The provided source directory path '{0}' exists but is no directory.")]
    SourceNoDirectory(Utf8PathBuf),
    /// The target of [`copy_children`] is absent
    #[error("The target directory '{0}' must exist.")]
    TargetMissing(Utf8PathBuf),
    /// The target of [`copy_children`] exists but is not a directory
    #[error("The provided target directory path '{0}' exists but is no directory.")]
    TargetNoDirectory(Utf8PathBuf),
    /// A source directory collided with a non-directory target entry
    #[error(
        "The source directory '{source_path}' can not be copied to '{target_path}' \
         because the target path already exists but is no directory."
    )]
    DirectoryOntoNonDirectory {
        /// The directory being copied
        source_path: Utf8PathBuf,
        /// The conflicting target path
        target_path: Utf8PathBuf,
    },
    /// A source directory collided with an existing target directory while
    /// merging was disabled
    #[error(
        "The source directory '{source_path}' can not be copied to '{target_path}' \
         because the target directory does already exist and merging directories is disabled."
    )]
    MergingDisabled {
        /// The directory being copied
        source_path: Utf8PathBuf,
        /// The pre-existing target directory
        target_path: Utf8PathBuf,
    },
    /// A source file collided with a non-file target entry
    #[error(
        "The file '{source_path}' can not be copied to '{target_path}' \
         because the target already exists and is no file."
    )]
    FileOntoNonFile {
        /// The file being copied
        source_path: Utf8PathBuf,
        /// The conflicting target path
        target_path: Utf8PathBuf,
    },
    /// A source file collided with an existing target file while overwriting
    /// was disabled
    #[error(
        "The file '{source_path}' can not be copied to '{target_path}' \
         because the target file already exists and overwriting files is disabled."
    )]
    OverwritingDisabled {
        /// The file being copied
        source_path: Utf8PathBuf,
        /// The pre-existing target file
        target_path: Utf8PathBuf,
    },
    /// The underlying filesystem operation failed
    #[error("Failed to copy '{source_path}' to '{target_path}'")]
    Io {
        /// The entry being copied
        source_path: Utf8PathBuf,
        /// The path being copied to
        target_path: Utf8PathBuf,
        /// The failed filesystem operation
        #[source]
        cause: io::Error,
    },
}

fn io_error(source_path: &Utf8Path, target_path: &Utf8Path, cause: io::Error) -> CopyError {
    CopyError::Io {
        source_path: source_path.to_owned(),
        target_path: target_path.to_owned(),
        cause,
    }
}

/// Copies every direct entry of `source_dir` into `target_dir`
///
/// Both directories must already exist. Each entry keeps its name and is
/// copied with [`copy`] under the same options; see there for the conflict
/// rules.
pub fn copy_children(
    source_dir: impl AsRef<Utf8Path>,
    target_dir: impl AsRef<Utf8Path>,
    options: CopyOptions,
) -> Result<(), CopyError> {
    let source_dir = source_dir.as_ref();
    let target_dir = target_dir.as_ref();
    if !source_dir.exists() {
        return Err(CopyError::SourceMissing(source_dir.to_owned()));
    }
    if !source_dir.is_dir() {
        return Err(CopyError::SourceNoDirectory(source_dir.to_owned()));
    }
    if !target_dir.exists() {
        return Err(CopyError::TargetMissing(target_dir.to_owned()));
    }
    if !target_dir.is_dir() {
        return Err(CopyError::TargetNoDirectory(target_dir.to_owned()));
    }
    let listing = fs::read_dir(source_dir).map_err(|cause| io_error(source_dir, target_dir, cause))?;
    for entry in listing {
        let entry = entry.map_err(|cause| io_error(source_dir, target_dir, cause))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        copy(source_dir.join(&name), target_dir.join(&name), options)?;
    }
    Ok(())
}

/// Copies a single file or directory to the given target path
///
/// A source directory is recreated at the target and its children copied
/// recursively; an existing target directory is merged into when
/// [`CopyOptions::merge_directories`] allows it. A source file is copied byte
/// for byte (never linked); an existing target file is replaced when
/// [`CopyOptions::overwrite_files`] allows it. A kind mismatch between source
/// and target is always an error.
pub fn copy(
    source: impl AsRef<Utf8Path>,
    target: impl AsRef<Utf8Path>,
    options: CopyOptions,
) -> Result<(), CopyError> {
    let source = source.as_ref();
    let target = target.as_ref();
    if source.is_dir() {
        if target.exists() && !target.is_dir() {
            return Err(CopyError::DirectoryOntoNonDirectory {
                source_path: source.to_owned(),
                target_path: target.to_owned(),
            });
        }
        if target.exists() && !options.merge_directories {
            return Err(CopyError::MergingDisabled {
                source_path: source.to_owned(),
                target_path: target.to_owned(),
            });
        }
        debug!("Copying directory {source} to {target}");
        if !target.exists() {
            fs::create_dir(target).map_err(|cause| io_error(source, target, cause))?;
        }
        copy_children(source, target, options)
    } else {
        if target.exists() {
            if !target.is_file() {
                return Err(CopyError::FileOntoNonFile {
                    source_path: source.to_owned(),
                    target_path: target.to_owned(),
                });
            }
            if !options.overwrite_files {
                return Err(CopyError::OverwritingDisabled {
                    source_path: source.to_owned(),
                    target_path: target.to_owned(),
                });
            }
            debug!("Deleting {target} to overwrite it with {source}");
            fs::remove_file(target).map_err(|cause| io_error(source, target, cause))?;
        }
        debug!("Copying file {source} to {target}");
        fs::copy(source, target).map_err(|cause| io_error(source, target, cause))?;
        Ok(())
    }
}
