//! Orphan resolution
//!
//! Runs against a fresh scan taken after duplicate cleanup. A filename
//! the attachment index has never heard of is an orphan; every copy is
//! relocated. Same-name copies under different recorded folders were
//! already settled by the duplicate phase and are not touched here.

use crate::core::backup::{orphan_name, BackupDir, RelocationOutcome};
use crate::core::db::AttachmentIndex;
use crate::core::scan::PdfFile;

/// Files whose filename has no attachment record, sorted by path for
/// stable output
pub fn find_orphans(files: &[PdfFile], index: &AttachmentIndex) -> Vec<PdfFile> {
    let mut orphans: Vec<PdfFile> = files
        .iter()
        .filter(|f| !index.contains_filename(&f.filename))
        .cloned()
        .collect();
    orphans.sort_by(|a, b| a.path.cmp(&b.path));
    orphans
}

/// Relocate orphans to the backup directory.
///
/// Same contract as duplicate relocation: `proceed == false` moves
/// nothing, per-file failures are collected and the batch continues.
pub fn relocate_orphans(
    orphans: &[PdfFile],
    backup: &BackupDir,
    proceed: bool,
) -> RelocationOutcome {
    let mut outcome = RelocationOutcome::default();
    if !proceed {
        return outcome;
    }

    for orphan in orphans {
        match backup.relocate(&orphan.path, &orphan_name(&orphan.folder, &orphan.filename)) {
            Ok(dest) => outcome.moved.push((orphan.path.clone(), dest)),
            Err(e) => outcome.failed.push((orphan.path.clone(), e.to_string())),
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
    fn test_unknown_filename_is_orphaned() {
        let tmp = tempdir().unwrap();
        make_pdf(tmp.path(), "QQ11WW", "ghost.pdf");
        make_pdf(tmp.path(), "AB12CD", "known.pdf");

        let index = index_of(&["AB12CD/known.pdf"]);
        let orphans = find_orphans(&scan_pdfs(tmp.path()), &index);

        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].filename, "ghost.pdf");
        assert_eq!(orphans[0].folder, "QQ11WW");
    }

    #[test]
    fn test_known_filename_in_wrong_folder_is_not_an_orphan() {
        // Folder placement was the duplicate phase's concern; a lone copy
        // of a known filename stays put no matter where it sits.
        let tmp = tempdir().unwrap();
        make_pdf(tmp.path(), "ZZ00XX", "known.pdf");

        let index = index_of(&["AB12CD/known.pdf"]);
        let orphans = find_orphans(&scan_pdfs(tmp.path()), &index);

        assert!(orphans.is_empty());
    }

    #[test]
    fn test_relocation_uses_orphan_naming() {
        let tmp = tempdir().unwrap();
        let backup_root = tempdir().unwrap();
        make_pdf(tmp.path(), "QQ11WW", "ghost.pdf");

        let index = index_of(&[]);
        let backup = BackupDir::create(backup_root.path()).unwrap();
        let orphans = find_orphans(&scan_pdfs(tmp.path()), &index);

        let outcome = relocate_orphans(&orphans, &backup, true);

        assert_eq!(outcome.moved_count(), 1);
        assert!(!tmp.path().join("QQ11WW/ghost.pdf").exists());
        assert!(backup_root.path().join("orphan_QQ11WW_ghost.pdf").exists());
    }

    #[test]
    fn test_declined_gate_moves_nothing() {
        let tmp = tempdir().unwrap();
        let backup_root = tempdir().unwrap();
        make_pdf(tmp.path(), "QQ11WW", "ghost.pdf");

        let index = index_of(&[]);
        let backup = BackupDir::create(backup_root.path()).unwrap();
        let orphans = find_orphans(&scan_pdfs(tmp.path()), &index);

        let outcome = relocate_orphans(&orphans, &backup, false);

        assert_eq!(outcome.moved_count(), 0);
        assert!(tmp.path().join("QQ11WW/ghost.pdf").exists());
    }

    #[test]
    fn test_every_copy_of_an_orphan_is_relocated() {
        let tmp = tempdir().unwrap();
        let backup_root = tempdir().unwrap();
        make_pdf(tmp.path(), "QQ11WW", "ghost.pdf");
        make_pdf(tmp.path(), "RR22EE", "ghost.pdf");

        let index = index_of(&[]);
        let backup = BackupDir::create(backup_root.path()).unwrap();
        let orphans = find_orphans(&scan_pdfs(tmp.path()), &index);

        let outcome = relocate_orphans(&orphans, &backup, true);

        assert_eq!(outcome.moved_count(), 2);
        assert!(backup_root.path().join("orphan_QQ11WW_ghost.pdf").exists());
        assert!(backup_root.path().join("orphan_RR22EE_ghost.pdf").exists());
    }
}
