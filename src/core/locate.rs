//! Zotero installation discovery
//!
//! Resolves the Zotero data directory the same way Zotero itself records
//! it: platform profile directory -> profiles.ini -> prefs.js
//! `extensions.zotero.dataDir` pref, falling back to the default data
//! directory next to the profile.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use regex::Regex;
use thiserror::Error;

/// Resolved Zotero locations used by the rest of the pipeline
#[derive(Debug, Clone)]
pub struct ZoteroDirs {
    /// The Zotero data directory (holds zotero.sqlite and storage/)
    pub data_dir: PathBuf,
    /// The attachment storage root
    pub storage_dir: PathBuf,
    /// Path to zotero.sqlite
    pub db_path: PathBuf,
}

impl ZoteroDirs {
    /// Auto-detect the data directory from the Zotero profile.
    ///
    /// Returns the resolved directories plus an optional warning when the
    /// dataDir pref is missing and the default location is assumed.
    pub fn discover() -> Result<(Self, Option<String>), LocateError> {
        let profile_dir = default_profile_dir()?;
        if !profile_dir.is_dir() {
            return Err(LocateError::ProfileDirMissing(profile_dir));
        }

        let profiles_ini = profile_dir.join("profiles.ini");
        if !profiles_ini.is_file() {
            return Err(LocateError::ProfilesIniMissing(profiles_ini));
        }

        let ini = fs::read_to_string(&profiles_ini)
            .map_err(|e| LocateError::Io(profiles_ini.clone(), e.to_string()))?;
        let profile_path = profile0_path(&ini)
            .ok_or_else(|| LocateError::ProfileEntryMissing(profiles_ini.clone()))?;

        let prefs_js = profile_dir.join(&profile_path).join("prefs.js");
        if !prefs_js.is_file() {
            return Err(LocateError::PrefsJsMissing(prefs_js));
        }

        let prefs = fs::read_to_string(&prefs_js)
            .map_err(|e| LocateError::Io(prefs_js.clone(), e.to_string()))?;

        let (data_dir, warning) = match data_dir_pref(&prefs) {
            Some(dir) => (PathBuf::from(dir), None),
            None => (
                profile_dir.join("Zotero"),
                Some("no custom data directory pref found, assuming the default location".into()),
            ),
        };

        let dirs = Self::from_data_dir(&data_dir)?;
        Ok((dirs, warning))
    }

    /// Build from an explicit data directory, validating its layout
    pub fn from_data_dir(data_dir: &Path) -> Result<Self, LocateError> {
        if !data_dir.is_dir() {
            return Err(LocateError::DataDirMissing(data_dir.to_path_buf()));
        }

        let storage_dir = data_dir.join("storage");
        if !storage_dir.is_dir() {
            return Err(LocateError::StorageDirMissing(storage_dir));
        }

        let db_path = data_dir.join("zotero.sqlite");
        if !db_path.is_file() {
            return Err(LocateError::DatabaseMissing(db_path));
        }

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            storage_dir,
            db_path,
        })
    }
}

/// Platform-specific Zotero profile directory
fn default_profile_dir() -> Result<PathBuf, LocateError> {
    let base = BaseDirs::new().ok_or(LocateError::NoHomeDir)?;
    let home = base.home_dir();

    if cfg!(target_os = "macos") {
        Ok(home.join("Library/Application Support/Zotero"))
    } else if cfg!(target_os = "linux") {
        Ok(home.join(".zotero/zotero"))
    } else if cfg!(target_os = "windows") {
        Ok(home.join("AppData").join("Roaming").join("Zotero").join("Zotero"))
    } else {
        Err(LocateError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}

/// Extract the Path value of the [Profile0] section from profiles.ini.
///
/// profiles.ini is a tiny INI file with a handful of known keys; a line
/// scan keeps this free of a dedicated INI dependency.
fn profile0_path(ini: &str) -> Option<String> {
    let mut in_profile0 = false;
    for line in ini.lines() {
        let line = line.trim();
        if line.starts_with('[') && line.ends_with(']') {
            in_profile0 = line == "[Profile0]";
            continue;
        }
        if in_profile0 {
            if let Some(value) = line.strip_prefix("Path=") {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

/// Extract the dataDir pref from prefs.js, if set
fn data_dir_pref(prefs: &str) -> Option<String> {
    let re = Regex::new(r#"user_pref\("extensions\.zotero\.dataDir",\s*"([^"]+)"\);"#)
        .expect("static regex");
    re.captures(prefs)
        .map(|caps| caps[1].replace("\\\\", "\\"))
}

/// Errors that can occur while locating the Zotero installation
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("unsupported operating system: {0}")]
    UnsupportedPlatform(String),

    #[error("could not determine the home directory")]
    NoHomeDir,

    #[error("Zotero profile directory does not exist: {0:?}")]
    ProfileDirMissing(PathBuf),

    #[error("profiles.ini not found: {0:?}")]
    ProfilesIniMissing(PathBuf),

    #[error("no [Profile0] entry with a Path in {0:?}")]
    ProfileEntryMissing(PathBuf),

    #[error("prefs.js not found: {0:?}")]
    PrefsJsMissing(PathBuf),

    #[error("Zotero data directory does not exist: {0:?}")]
    DataDirMissing(PathBuf),

    #[error("storage directory does not exist: {0:?}")]
    StorageDirMissing(PathBuf),

    #[error("database file does not exist: {0:?}")]
    DatabaseMissing(PathBuf),

    #[error("failed to read {0:?}: {1}")]
    Io(PathBuf, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_profile0_path_parses_standard_ini() {
        let ini = "[General]\nStartWithLastProfile=1\n\n[Profile0]\nName=default\nIsRelative=1\nPath=Profiles/abcd1234.default\nDefault=1\n";
        assert_eq!(
            profile0_path(ini).as_deref(),
            Some("Profiles/abcd1234.default")
        );
    }

    #[test]
    fn test_profile0_path_ignores_other_sections() {
        let ini = "[Profile1]\nPath=Profiles/other\n";
        assert_eq!(profile0_path(ini), None);
    }

    #[test]
    fn test_data_dir_pref_extracts_and_unescapes() {
        let prefs = r#"user_pref("extensions.zotero.dataDir", "C:\\\\Users\\\\me\\\\Zotero");"#;
        assert_eq!(
            data_dir_pref(prefs).as_deref(),
            Some(r"C:\Users\me\Zotero")
        );

        let prefs = r#"user_pref("extensions.zotero.dataDir", "/home/me/Zotero");"#;
        assert_eq!(data_dir_pref(prefs).as_deref(), Some("/home/me/Zotero"));
    }

    #[test]
    fn test_data_dir_pref_absent() {
        assert_eq!(data_dir_pref(r#"user_pref("other.pref", "x");"#), None);
    }

    #[test]
    fn test_from_data_dir_validates_layout() {
        let tmp = tempdir().unwrap();

        let err = ZoteroDirs::from_data_dir(tmp.path().join("missing").as_path()).unwrap_err();
        assert!(matches!(err, LocateError::DataDirMissing(_)));

        let err = ZoteroDirs::from_data_dir(tmp.path()).unwrap_err();
        assert!(matches!(err, LocateError::StorageDirMissing(_)));

        std::fs::create_dir(tmp.path().join("storage")).unwrap();
        let err = ZoteroDirs::from_data_dir(tmp.path()).unwrap_err();
        assert!(matches!(err, LocateError::DatabaseMissing(_)));

        std::fs::write(tmp.path().join("zotero.sqlite"), b"").unwrap();
        let dirs = ZoteroDirs::from_data_dir(tmp.path()).unwrap();
        assert_eq!(dirs.storage_dir, tmp.path().join("storage"));
        assert_eq!(dirs.db_path, tmp.path().join("zotero.sqlite"));
    }
}
