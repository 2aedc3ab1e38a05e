//! Structured run summaries
//!
//! Core operations return these instead of printing; the CLI decides how
//! to render them (styled text or JSON).

use std::path::PathBuf;

use serde::Serialize;

/// Summary of a full `clean` run
#[derive(Debug, Serialize)]
pub struct CleanSummary {
    /// PDFs found in the initial scan
    pub pdf_files_scanned: usize,
    /// Distinct filenames known to the database
    pub db_filenames: usize,
    /// Folder names known to the database
    pub db_folders: usize,
    pub duplicates_moved: usize,
    pub orphans_moved: usize,
    pub empty_folders_removed: usize,
    pub invalid_folders_removed: usize,
    pub backup_dir: PathBuf,
}

impl CleanSummary {
    pub fn folders_removed(&self) -> usize {
        self.empty_folders_removed + self.invalid_folders_removed
    }
}

/// Summary of a read-only `status` run
#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub pdf_files_scanned: usize,
    pub db_filenames: usize,
    pub db_folders: usize,
    /// Filenames present in more than one folder
    pub duplicate_groups: usize,
    /// Copies a `clean` run would relocate as duplicates
    pub duplicate_copies_to_move: usize,
    /// Files a `clean` run would relocate as orphans
    pub orphans: usize,
    /// Folders a first pruning pass would remove as empty
    pub empty_folder_candidates: usize,
    /// Folders a first pruning pass would remove as invalid
    pub invalid_folder_candidates: usize,
}
