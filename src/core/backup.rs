//! Backup directory and collision-safe relocation
//!
//! Nothing in the duplicate or orphan phases deletes a file; everything
//! is moved here under a name that records where it came from. On a name
//! collision a numeric suffix goes before the extension, so an existing
//! backup is never overwritten.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result, WrapErr};

/// A writable directory receiving relocated files
#[derive(Debug, Clone)]
pub struct BackupDir {
    root: PathBuf,
}

impl BackupDir {
    /// Create (or reuse) the backup directory
    pub fn create(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to create backup directory {}", path.display()))?;
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Move `src` into the backup directory under `dest_name`,
    /// suffixing `_1`, `_2`, ... before the extension on collision.
    /// Returns the final destination path.
    pub fn relocate(&self, src: &Path, dest_name: &str) -> io::Result<PathBuf> {
        let dest = self.unique_dest(dest_name);
        move_file(src, &dest)?;
        Ok(dest)
    }

    fn unique_dest(&self, dest_name: &str) -> PathBuf {
        let mut dest = self.root.join(dest_name);
        let (stem, ext) = split_name(dest_name);

        let mut counter = 1;
        while dest.exists() {
            dest = self.root.join(format!("{stem}_{counter}{ext}"));
            counter += 1;
        }
        dest
    }
}

/// Result of a batch relocation. Failures never abort the batch; they
/// are collected here for the caller to report.
#[derive(Debug, Default)]
pub struct RelocationOutcome {
    /// (source, destination) for every file that was moved
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// (source, error) for every file that could not be moved
    pub failed: Vec<(PathBuf, String)>,
}

impl RelocationOutcome {
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }
}

/// Backup file name for a relocated duplicate
pub fn dup_name(folder: &str, filename: &str) -> String {
    format!("dup_{folder}_{filename}")
}

/// Backup file name for a relocated orphan
pub fn orphan_name(folder: &str, filename: &str) -> String {
    format!("orphan_{folder}_{filename}")
}

/// Split a file name into (stem, extension-with-dot)
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Rename, falling back to copy + remove when the backup directory is on
/// a different filesystem.
fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(src, dest)?;
            fs::remove_file(src)
        }
    }
}
