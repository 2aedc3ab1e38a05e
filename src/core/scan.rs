//! Storage scanning
//!
//! Pure enumeration of the storage tree. The pipeline re-runs the scan
//! after the duplicate phase mutates the filesystem, so this must never
//! cache across calls.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One PDF found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File name, as stored on disk
    pub filename: String,
    /// Name of the immediate parent directory
    pub folder: String,
}

/// Recursively enumerate all PDFs under the storage root.
///
/// Unreadable entries are skipped; the match on `.pdf` is
/// case-insensitive.
pub fn scan_pdfs(storage_root: &Path) -> Vec<PdfFile> {
    WalkDir::new(storage_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let filename = e.file_name().to_str()?.to_string();
            if !filename.to_lowercase().ends_with(".pdf") {
                return None;
            }
            let folder = e
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())?
                .to_string();
            Some(PdfFile {
                path: e.path().to_path_buf(),
                filename,
                folder,
            })
        })
        .collect()
}

/// Group scanned files by filename
pub fn group_by_filename(files: &[PdfFile]) -> HashMap<&str, Vec<&PdfFile>> {
    let mut groups: HashMap<&str, Vec<&PdfFile>> = HashMap::new();
    for file in files {
        groups.entry(file.filename.as_str()).or_default().push(file);
    }
    groups
}
