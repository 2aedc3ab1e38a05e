//! Core reconciliation engine
//!
//! The pipeline runs in a fixed order: build the attachment index from
//! zotero.sqlite, scan storage, relocate duplicates, re-scan, relocate
//! orphans, then prune dead folders. Each phase reads the filesystem
//! state the previous phase produced, so the order is load-bearing.

pub mod backup;
pub mod db;
pub mod dedupe;
pub mod locate;
pub mod orphan;
pub mod prune;
pub mod report;
pub mod scan;
