//! Folder pruning
//!
//! Removes storage folders that no longer earn their keep: folders that
//! are empty (ignoring OS artifact files) and folders with no PDF
//! anywhere below whose name the database has never recorded. Folders
//! holding a PDF somewhere, or whose name is in the valid set, are always
//! preserved.
//!
//! Each iteration collects candidate folders bottom-up and only then
//! acts, so deletions never confuse the traversal. Iterations repeat
//! until a full pass deletes nothing, which picks up parents left empty
//! by a previous pass.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::db::AttachmentIndex;

/// Entries that do not count toward a folder being non-empty
const ARTIFACT_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini", ".zotero-ft-cache"];

/// What a pruning run removed, and what it had to skip
#[derive(Debug, Default)]
pub struct PruneOutcome {
    /// Folders removed because they were empty
    pub empty_removed: Vec<PathBuf>,
    /// Folders removed because they held no PDF and were unknown to the database
    pub invalid_removed: Vec<PathBuf>,
    /// (folder, error) for folders that could not be inspected or removed
    pub failed: Vec<(PathBuf, String)>,
}

impl PruneOutcome {
    pub fn removed_count(&self) -> usize {
        self.empty_removed.len() + self.invalid_removed.len()
    }
}

/// Why a folder is due for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Empty,
    Invalid,
}

/// Prune the storage tree to a fixed point
pub fn prune_folders(storage_root: &Path, index: &AttachmentIndex) -> PruneOutcome {
    let mut outcome = PruneOutcome::default();

    loop {
        let mut deleted_this_pass = false;

        // Bottom-up, so children are settled before their parents
        for dir in collect_folders(storage_root) {
            // A recursive removal earlier in the pass may have taken this
            // folder with it
            if !dir.exists() {
                continue;
            }

            match classify(&dir, index) {
                Some(Removal::Empty) => match remove_empty(&dir) {
                    Ok(()) => {
                        outcome.empty_removed.push(dir);
                        deleted_this_pass = true;
                    }
                    Err(e) => outcome.failed.push((dir, e)),
                },
                Some(Removal::Invalid) => match remove_subtree(&dir) {
                    Ok(()) => {
                        outcome.invalid_removed.push(dir);
                        deleted_this_pass = true;
                    }
                    Err(e) => outcome.failed.push((dir, e)),
                },
                None => {}
            }
        }

        if !deleted_this_pass {
            break;
        }
    }

    outcome
}

/// Classify every current folder without touching anything (dry runs)
pub fn prune_candidates(storage_root: &Path, index: &AttachmentIndex) -> Vec<(PathBuf, Removal)> {
    collect_folders(storage_root)
        .into_iter()
        .filter_map(|dir| classify(&dir, index).map(|r| (dir, r)))
        .collect()
}

/// All folders under the root (excluding the root itself), deepest first
fn collect_folders(storage_root: &Path) -> Vec<PathBuf> {
    WalkDir::new(storage_root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect()
}

fn classify(dir: &Path, index: &AttachmentIndex) -> Option<Removal> {
    let name = dir.file_name()?.to_str()?;

    // Valid folder names are never removed, even when empty
    if index.is_valid_folder(name) {
        return None;
    }

    if is_empty_ignoring_artifacts(dir) {
        return Some(Removal::Empty);
    }

    if !has_pdf_anywhere(dir) {
        return Some(Removal::Invalid);
    }

    None
}

/// Whether the folder holds nothing but OS artifact files.
/// Unreadable folders count as non-empty.
fn is_empty_ignoring_artifacts(dir: &Path) -> bool {
    match fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).all(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| ARTIFACT_FILES.contains(&name))
        }),
        Err(_) => false,
    }
}

/// Whether any file below the folder is a PDF.
/// Unreadable subtrees count as containing one, so they are preserved.
fn has_pdf_anywhere(dir: &Path) -> bool {
    for entry in WalkDir::new(dir) {
        match entry {
            Ok(e) => {
                if e.file_type().is_file()
                    && e.file_name().to_string_lossy().to_lowercase().ends_with(".pdf")
                {
                    return true;
                }
            }
            Err(_) => return true,
        }
    }
    false
}

/// Remove an empty folder, dropping its artifact entries first so the
/// non-recursive removal succeeds
fn remove_empty(dir: &Path) -> Result<(), String> {
    let entries = fs::read_dir(dir).map_err(|e| e.to_string())?;
    for entry in entries.filter_map(|e| e.ok()) {
        fs::remove_file(entry.path()).map_err(|e| e.to_string())?;
    }
    fs::remove_dir(dir).map_err(|e| e.to_string())
}

/// Recursively remove a folder, clearing read-only bits on the way so
/// the removal does not trip over write-protected entries
fn remove_subtree(dir: &Path) -> Result<(), String> {
    clear_readonly(dir);
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        clear_readonly(entry.path());
    }
    fs::remove_dir_all(dir).map_err(|e| e.to_string())
}

fn clear_readonly(path: &Path) {
    if let Ok(metadata) = fs::metadata(path) {
        let mut perms = metadata.permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        let _ = fs::set_permissions(path, perms);
    }
}
