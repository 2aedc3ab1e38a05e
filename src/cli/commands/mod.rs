//! Command implementations

pub mod clean;
pub mod locate;
pub mod status;

use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::core::locate::ZoteroDirs;

/// Resolve the Zotero directories, honoring `--data-dir`.
///
/// Discovery warnings (e.g. missing dataDir pref) go to stderr so they
/// never pollute machine-readable output.
pub fn resolve_dirs(global: &GlobalOpts) -> Result<ZoteroDirs> {
    match &global.data_dir {
        Some(dir) => ZoteroDirs::from_data_dir(dir).map_err(|e| miette::miette!("{}", e)),
        None => {
            let (dirs, warning) = ZoteroDirs::discover().map_err(|e| miette::miette!("{}", e))?;
            if let Some(warning) = warning {
                if !global.quiet {
                    eprintln!("{} {}", style("⚠").yellow(), warning);
                }
            }
            Ok(dirs)
        }
    }
}
