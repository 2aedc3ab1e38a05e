//! Duplicate resolution
//!
//! A filename that exists in more than one storage folder is a duplicate
//! group. Copies sitting in a folder the database records for that
//! filename are kept; every other copy is relocated. When the database
//! does not know the filename at all, no copy has a claim to stay and the
//! whole group is relocated.

use crate::core::backup::{dup_name, BackupDir, RelocationOutcome};
use crate::core::db::AttachmentIndex;
use crate::core::scan::{group_by_filename, PdfFile};

/// One filename with more than one on-disk copy, classified against the index
#[derive(Debug)]
pub struct DuplicateGroup {
    pub filename: String,
    /// Whether the filename appears in the attachment index
    pub known: bool,
    /// Copies whose folder is recorded for this filename
    pub keep: Vec<PdfFile>,
    /// Copies to relocate
    pub remove: Vec<PdfFile>,
}

/// Classify every duplicate filename against the attachment index.
///
/// Groups are sorted by filename so output and relocation order are
/// stable across runs.
pub fn find_duplicates(files: &[PdfFile], index: &AttachmentIndex) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = group_by_filename(files)
        .into_iter()
        .filter(|(_, copies)| copies.len() > 1)
        .map(|(filename, copies)| {
            let known = index.contains_filename(filename);
            let mut keep = Vec::new();
            let mut remove = Vec::new();

            for copy in copies {
                if known && index.folder_matches(filename, &copy.folder) {
                    keep.push(copy.clone());
                } else {
                    remove.push(copy.clone());
                }
            }

            DuplicateGroup {
                filename: filename.to_string(),
                known,
                keep,
                remove,
            }
        })
        .collect();

    groups.sort_by(|a, b| a.filename.cmp(&b.filename));
    groups
}

/// Relocate every marked copy to the backup directory.
///
/// `proceed` carries the caller's confirmation decision; when false,
/// nothing is moved and the outcome reports zero. Per-file failures are
/// collected, not fatal.
pub fn relocate_duplicates(
    groups: &[DuplicateGroup],
    backup: &BackupDir,
    proceed: bool,
) -> RelocationOutcome {
    let mut outcome = RelocationOutcome::default();
    if !proceed {
        return outcome;
    }

    for group in groups {
        for copy in &group.remove {
            match backup.relocate(&copy.path, &dup_name(&copy.folder, &copy.filename)) {
                Ok(dest) => outcome.moved.push((copy.path.clone(), dest)),
                Err(e) => outcome.failed.push((copy.path.clone(), e.to_string())),
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::{AttachmentIndex, AttachmentRecord};
    use crate::core::scan::scan_pdfs;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn index_of(paths: &[&str]) -> AttachmentIndex {
        AttachmentIndex::from_records(
            paths
                .iter()
                .enumerate()
                .map(|(i, p)| AttachmentRecord {
                    item_id: i as i64 + 1,
                    parent_item_id: None,
                    stored_path: format!("storage:{p}"),
                    item_key: Some(format!("KEY{i}")),
                })
                .collect(),
        )
    }

    fn make_pdf(root: &Path, folder: &str, name: &str) {
        fs::create_dir_all(root.join(folder)).unwrap();
        fs::write(root.join(folder).join(name), b"pdf").unwrap();
    }

    #[test]
    fn test_known_duplicate_keeps_recorded_folder() {
        let tmp = tempdir().unwrap();
        make_pdf(tmp.path(), "AB12CD", "a.pdf");
        make_pdf(tmp.path(), "XY99ZZ", "a.pdf");

        let index = index_of(&["AB12CD/a.pdf"]);
        let groups = find_duplicates(&scan_pdfs(tmp.path()), &index);

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert!(group.known);
        assert_eq!(group.keep.len(), 1);
        assert_eq!(group.keep[0].folder, "AB12CD");
        assert_eq!(group.remove.len(), 1);
        assert_eq!(group.remove[0].folder, "XY99ZZ");
    }

    #[test]
    fn test_unknown_duplicate_removes_all_copies() {
        let tmp = tempdir().unwrap();
        make_pdf(tmp.path(), "QQ11WW", "ghost.pdf");
        make_pdf(tmp.path(), "RR22EE", "ghost.pdf");

        let index = index_of(&["AB12CD/other.pdf"]);
        let groups = find_duplicates(&scan_pdfs(tmp.path()), &index);

        assert_eq!(groups.len(), 1);
        assert!(!groups[0].known);
        assert!(groups[0].keep.is_empty());
        assert_eq!(groups[0].remove.len(), 2);
    }

    #[test]
    fn test_unique_files_form_no_group() {
        let tmp = tempdir().unwrap();
        make_pdf(tmp.path(), "AB12CD", "a.pdf");
        make_pdf(tmp.path(), "XY99ZZ", "b.pdf");

        let index = index_of(&["AB12CD/a.pdf"]);
        assert!(find_duplicates(&scan_pdfs(tmp.path()), &index).is_empty());
    }

    #[test]
    fn test_relocation_moves_marked_copies() {
        let tmp = tempdir().unwrap();
        let backup_root = tempdir().unwrap();
        make_pdf(tmp.path(), "AB12CD", "a.pdf");
        make_pdf(tmp.path(), "XY99ZZ", "a.pdf");

        let index = index_of(&["AB12CD/a.pdf"]);
        let backup = BackupDir::create(backup_root.path()).unwrap();
        let groups = find_duplicates(&scan_pdfs(tmp.path()), &index);

        let outcome = relocate_duplicates(&groups, &backup, true);

        assert_eq!(outcome.moved_count(), 1);
        assert!(outcome.failed.is_empty());
        assert!(tmp.path().join("AB12CD/a.pdf").exists());
        assert!(!tmp.path().join("XY99ZZ/a.pdf").exists());
        assert!(backup_root.path().join("dup_XY99ZZ_a.pdf").exists());
    }

    #[test]
    fn test_declined_gate_moves_nothing() {
        let tmp = tempdir().unwrap();
        let backup_root = tempdir().unwrap();
        make_pdf(tmp.path(), "AB12CD", "a.pdf");
        make_pdf(tmp.path(), "XY99ZZ", "a.pdf");

        let index = index_of(&[]);
        let backup = BackupDir::create(backup_root.path()).unwrap();
        let groups = find_duplicates(&scan_pdfs(tmp.path()), &index);

        let outcome = relocate_duplicates(&groups, &backup, false);

        assert_eq!(outcome.moved_count(), 0);
        assert!(tmp.path().join("AB12CD/a.pdf").exists());
        assert!(tmp.path().join("XY99ZZ/a.pdf").exists());
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let tmp = tempdir().unwrap();
        let backup_root = tempdir().unwrap();
        make_pdf(tmp.path(), "AB12CD", "a.pdf");
        make_pdf(tmp.path(), "XY99ZZ", "a.pdf");

        let index = index_of(&["AB12CD/a.pdf"]);
        let backup = BackupDir::create(backup_root.path()).unwrap();

        let groups = find_duplicates(&scan_pdfs(tmp.path()), &index);
        let first = relocate_duplicates(&groups, &backup, true);
        assert_eq!(first.moved_count(), 1);

        // No duplicates remain, so a second pass finds nothing to move
        let groups = find_duplicates(&scan_pdfs(tmp.path()), &index);
        assert!(groups.is_empty());
        let second = relocate_duplicates(&groups, &backup, true);
        assert_eq!(second.moved_count(), 0);
    }

    #[test]
    fn test_same_filename_in_two_recorded_folders_both_kept() {
        let tmp = tempdir().unwrap();
        make_pdf(tmp.path(), "AAAA1111", "shared.pdf");
        make_pdf(tmp.path(), "BBBB2222", "shared.pdf");

        let index = index_of(&["AAAA1111/shared.pdf", "BBBB2222/shared.pdf"]);
        let groups = find_duplicates(&scan_pdfs(tmp.path()), &index);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].keep.len(), 2);
        assert!(groups[0].remove.is_empty());
    }
}
