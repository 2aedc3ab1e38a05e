//! `zotsweep clean` command - Run the full cleanup pipeline
//!
//! Phase order is fixed: duplicate relocation, re-scan, orphan
//! relocation, folder pruning. Each phase reads the filesystem state the
//! previous one produced. The two relocation phases sit behind
//! confirmation gates; `--yes` pre-answers them and `--dry-run` reports
//! without mutating.

use std::path::PathBuf;

use console::style;
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::commands::resolve_dirs;
use crate::core::backup::{BackupDir, RelocationOutcome};
use crate::core::db::AttachmentIndex;
use crate::core::dedupe::{find_duplicates, relocate_duplicates, DuplicateGroup};
use crate::core::orphan::{find_orphans, relocate_orphans};
use crate::core::prune::{prune_candidates, prune_folders, PruneOutcome, Removal};
use crate::core::report::CleanSummary;
use crate::core::scan::{scan_pdfs, PdfFile};

#[derive(clap::Args, Debug)]
pub struct CleanArgs {
    /// Directory that receives relocated duplicates and orphans
    #[arg(long, short = 'b')]
    pub backup_dir: PathBuf,

    /// Answer yes to all confirmation prompts
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Report what would happen without touching anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: CleanArgs, global: &GlobalOpts) -> Result<()> {
    let narrate = !global.quiet && global.format == OutputFormat::Text;

    let dirs = resolve_dirs(global)?;
    if narrate {
        println!("Data directory:    {}", dirs.data_dir.display());
        println!("Storage directory: {}", dirs.storage_dir.display());
    }

    let files = scan_pdfs(&dirs.storage_dir);
    if narrate {
        println!("Found {} PDF files", files.len());
    }
    let pdf_files_scanned = files.len();

    let index = AttachmentIndex::load(&dirs.db_path)?;
    if narrate {
        println!(
            "Database: {} filenames across {} folders",
            index.filename_count(),
            index.valid_folders().len()
        );
    }

    if files.is_empty() {
        if narrate {
            println!("Nothing to reconcile.");
        }
        return Ok(());
    }

    let backup = BackupDir::create(&args.backup_dir)?;

    // Phase 1: duplicates
    let groups = find_duplicates(&files, &index);
    if narrate {
        print_duplicate_groups(&groups);
    }
    let to_move: usize = groups.iter().map(|g| g.remove.len()).sum();
    let proceed = to_move > 0
        && !args.dry_run
        && confirm(
            &format!("Move {to_move} duplicate files to the backup directory?"),
            args.yes,
        )?;
    let dup_outcome = relocate_duplicates(&groups, &backup, proceed);
    if narrate {
        print_relocation(&dup_outcome, to_move, args.dry_run, "duplicate", global.verbose);
    }

    // Phase 2: orphans, against the post-relocation state
    let files = if dup_outcome.moved_count() > 0 {
        scan_pdfs(&dirs.storage_dir)
    } else {
        files
    };
    let orphans = find_orphans(&files, &index);
    if narrate {
        print_orphans(&orphans);
    }
    let proceed = !orphans.is_empty()
        && !args.dry_run
        && confirm(
            &format!(
                "Move {} orphaned files to the backup directory?",
                orphans.len()
            ),
            args.yes,
        )?;
    let orphan_outcome = relocate_orphans(&orphans, &backup, proceed);
    if narrate {
        print_relocation(&orphan_outcome, orphans.len(), args.dry_run, "orphaned", global.verbose);
    }

    // Phase 3: folder pruning (no gate, mirrors the relocation-only safety
    // net: files were moved, folders are what actually gets deleted)
    let prune_outcome = if args.dry_run {
        let candidates = prune_candidates(&dirs.storage_dir, &index);
        if narrate {
            print_prune_candidates(&candidates);
        }
        PruneOutcome::default()
    } else {
        let outcome = prune_folders(&dirs.storage_dir, &index);
        if narrate {
            print_prune(&outcome);
        }
        outcome
    };

    let summary = CleanSummary {
        pdf_files_scanned,
        db_filenames: index.filename_count(),
        db_folders: index.valid_folders().len(),
        duplicates_moved: dup_outcome.moved_count(),
        orphans_moved: orphan_outcome.moved_count(),
        empty_folders_removed: prune_outcome.empty_removed.len(),
        invalid_folders_removed: prune_outcome.invalid_removed.len(),
        backup_dir: backup.root().to_path_buf(),
    };

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).into_diagnostic()?
            );
        }
        OutputFormat::Text => {
            if !global.quiet {
                print_summary(&summary);
            }
        }
    }

    Ok(())
}

fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

fn print_duplicate_groups(groups: &[DuplicateGroup]) {
    if groups.is_empty() {
        println!("{} No duplicate PDF files", style("✓").green());
        return;
    }

    println!();
    println!(
        "{}",
        style(format!("{} duplicated filenames:", groups.len())).bold()
    );
    for group in groups {
        println!(
            "  {} ({} copies{})",
            group.filename,
            group.keep.len() + group.remove.len(),
            if group.known { "" } else { ", not in database" }
        );
        for copy in &group.keep {
            println!("    {} keep   {}/", style("✓").green(), copy.folder);
        }
        for copy in &group.remove {
            println!("    {} move   {}/", style("✗").red(), copy.folder);
        }
    }
}

fn print_orphans(orphans: &[PdfFile]) {
    if orphans.is_empty() {
        println!("{} No orphaned PDF files", style("✓").green());
        return;
    }

    println!();
    println!(
        "{}",
        style(format!("{} orphaned files (not in database):", orphans.len())).bold()
    );
    for orphan in orphans {
        println!("  {} {}/{}", style("✗").red(), orphan.folder, orphan.filename);
    }
}

fn print_relocation(
    outcome: &RelocationOutcome,
    candidates: usize,
    dry_run: bool,
    kind: &str,
    verbose: bool,
) {
    if verbose {
        for (src, dest) in &outcome.moved {
            println!("  {} → {}", src.display(), dest.display());
        }
    }
    for (path, error) in &outcome.failed {
        println!(
            "{} Failed to move {}: {}",
            style("⚠").yellow(),
            path.display(),
            error
        );
    }
    if dry_run && candidates > 0 {
        println!(
            "{} Would move {} {} files (dry run)",
            style("→").blue(),
            candidates,
            kind
        );
    } else if outcome.moved_count() > 0 || candidates > 0 {
        println!(
            "{} Moved {} {} files",
            style("✓").green(),
            outcome.moved_count(),
            kind
        );
    }
}

fn print_prune(outcome: &PruneOutcome) {
    for (dir, error) in &outcome.failed {
        println!(
            "{} Skipped folder {}: {}",
            style("⚠").yellow(),
            dir.display(),
            error
        );
    }
    println!(
        "{} Removed {} folders ({} empty, {} without PDFs)",
        style("✓").green(),
        outcome.removed_count(),
        outcome.empty_removed.len(),
        outcome.invalid_removed.len()
    );
}

fn print_prune_candidates(candidates: &[(PathBuf, Removal)]) {
    let empty = candidates
        .iter()
        .filter(|(_, r)| *r == Removal::Empty)
        .count();
    println!(
        "{} Would remove {} folders ({} empty, {} without PDFs) (dry run)",
        style("→").blue(),
        candidates.len(),
        empty,
        candidates.len() - empty
    );
}

fn print_summary(summary: &CleanSummary) {
    println!();
    println!("{}", style("Cleanup complete").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!("  Duplicates moved: {}", style(summary.duplicates_moved).cyan());
    println!("  Orphans moved:    {}", style(summary.orphans_moved).cyan());
    println!(
        "  Folders removed:  {} ({} empty, {} invalid)",
        style(summary.folders_removed()).cyan(),
        summary.empty_folders_removed,
        summary.invalid_folders_removed
    );
    println!("  Backup location:  {}", summary.backup_dir.display());
}
