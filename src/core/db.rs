//! Attachment index built from zotero.sqlite
//!
//! One read-only query joins itemAttachments to items; each row's stored
//! path is split into the expected (folder, filename) identity. The index
//! maps filename -> every record claiming it, plus the set of all folder
//! names known to the database. Rows with malformed paths are skipped,
//! never fatal; failing to open or query the database is fatal.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use miette::{IntoDiagnostic, Result, WrapErr};
use rusqlite::{Connection, OpenFlags};

/// One attachment row as returned by the database
#[derive(Debug, Clone)]
pub struct AttachmentRecord {
    pub item_id: i64,
    pub parent_item_id: Option<i64>,
    pub stored_path: String,
    pub item_key: Option<String>,
}

/// The expected identity derived from one attachment record
#[derive(Debug, Clone)]
pub struct AttachmentRef {
    /// Storage folder expected to hold the file
    pub folder: String,
    /// Key of the attachment item itself
    pub item_key: String,
    pub item_id: i64,
    /// The raw stored path, kept for reporting
    pub stored_path: String,
}

/// Index of every attachment the database knows about
#[derive(Debug, Default)]
pub struct AttachmentIndex {
    by_filename: HashMap<String, Vec<AttachmentRef>>,
    valid_folders: HashSet<String>,
    record_count: usize,
}

impl AttachmentIndex {
    /// Load the index from zotero.sqlite
    pub fn load(db_path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to open database {}", db_path.display()))?;

        let mut stmt = conn
            .prepare(
                "SELECT ia.itemID, ia.parentItemID, ia.path, i.key \
                 FROM itemAttachments ia \
                 LEFT JOIN items i ON ia.itemID = i.itemID \
                 WHERE ia.path IS NOT NULL",
            )
            .into_diagnostic()
            .wrap_err("failed to query attachment records")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(AttachmentRecord {
                    item_id: row.get(0)?,
                    parent_item_id: row.get(1)?,
                    stored_path: row.get(2)?,
                    item_key: row.get(3)?,
                })
            })
            .into_diagnostic()?;

        let records = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .into_diagnostic()
            .wrap_err("failed to read attachment records")?;

        Ok(Self::from_records(records))
    }

    /// Build the index from raw records, skipping unparsable paths
    pub fn from_records(records: Vec<AttachmentRecord>) -> Self {
        let mut index = Self::default();

        for record in records {
            let Some((filename, attachment)) = derive_identity(&record) else {
                continue;
            };
            index.valid_folders.insert(attachment.folder.clone());
            index.record_count += 1;
            index.by_filename.entry(filename).or_default().push(attachment);
        }

        index
    }

    /// Whether the database knows this filename at all
    pub fn contains_filename(&self, filename: &str) -> bool {
        self.by_filename.contains_key(filename)
    }

    /// All records claiming the given filename
    pub fn refs_for(&self, filename: &str) -> Option<&[AttachmentRef]> {
        self.by_filename.get(filename).map(|v| v.as_slice())
    }

    /// Whether any record expects the given folder to be in that filename's set
    pub fn folder_matches(&self, filename: &str, folder: &str) -> bool {
        self.refs_for(filename)
            .is_some_and(|refs| refs.iter().any(|r| r.folder == folder))
    }

    /// Whether the folder name appears in any attachment record
    pub fn is_valid_folder(&self, folder: &str) -> bool {
        self.valid_folders.contains(folder)
    }

    /// The set of all folder names known to the database
    pub fn valid_folders(&self) -> &HashSet<String> {
        &self.valid_folders
    }

    /// Number of distinct filenames
    pub fn filename_count(&self) -> usize {
        self.by_filename.len()
    }

    /// Number of records that parsed into an identity
    pub fn record_count(&self) -> usize {
        self.record_count
    }
}

/// Derive (filename, ref) from a record's stored path.
///
/// Stored paths look like `storage:folder/file.pdf` or `storage:file.pdf`;
/// when no folder segment is present, the attachment item's key names the
/// folder. Rows without a `:` (and folderless rows without an item key)
/// have no usable identity and are dropped.
fn derive_identity(record: &AttachmentRecord) -> Option<(String, AttachmentRef)> {
    let (_, remainder) = record.stored_path.split_once(':')?;

    let remainder = remainder.replace('\\', "/");
    let (folder, filename) = if remainder.contains('/') {
        let folder = remainder.split('/').next()?.to_string();
        let filename = remainder.rsplit('/').next()?.to_string();
        (folder, filename)
    } else {
        let key = record.item_key.clone()?;
        (key, remainder.clone())
    };

    if filename.is_empty() || folder.is_empty() {
        return None;
    }

    let item_key = record.item_key.clone().unwrap_or_else(|| folder.clone());
    Some((
        filename,
        AttachmentRef {
            folder,
            item_key,
            item_id: record.item_id,
            stored_path: record.stored_path.clone(),
        },
    ))
}
