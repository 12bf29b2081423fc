// src/config.rs

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Name of the user rule document inside the storage directory.
pub const RULE_FILE_NAME: &str = "Rule.json";
/// Plain-text file explaining how to write `Rule.json`.
pub const HINT_FILE_NAME: &str = "How to customize rules.txt";
/// Writable only with an elevated (jailbreak / TrollStore) install.
pub const INSTALL_PROBE_PATH: &str = "/var/mobile/Library/Preferences";

/// Overrides the storage directory (tests, sandboxed shells).
pub const STORAGE_DIR_ENV: &str = "RESIDUE_CLEANER_STORAGE_DIR";
/// Set to 1/true/yes to stop asking the desktop for scheme handlers.
pub const DISABLE_SCHEME_QUERY_ENV: &str = "RESIDUE_CLEANER_DISABLE_SCHEME_QUERY";

const APP_DIR_NAME: &str = "clear-filza-residue";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Directory holding the rule document and the hint file.
    pub storage_dir: PathBuf,
    pub rule_file_name: String,
    pub hint_file_name: String,
    /// Directory whose writability gates deletion altogether.
    pub install_probe_path: PathBuf,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        CleanerConfig {
            storage_dir: default_storage_dir(),
            rule_file_name: RULE_FILE_NAME.to_string(),
            hint_file_name: HINT_FILE_NAME.to_string(),
            install_probe_path: PathBuf::from(INSTALL_PROBE_PATH),
        }
    }
}

impl CleanerConfig {
    /// Defaults with an explicit storage directory.
    pub fn with_storage_dir(storage_dir: impl Into<PathBuf>) -> Self {
        CleanerConfig {
            storage_dir: storage_dir.into(),
            ..Self::default()
        }
    }

    pub fn rule_file_path(&self) -> PathBuf {
        self.storage_dir.join(&self.rule_file_name)
    }

    pub fn hint_file_path(&self) -> PathBuf {
        self.storage_dir.join(&self.hint_file_name)
    }
}

/// Env override, then the user's Documents folder (the app sandbox on iOS),
/// then a per-app data directory.
fn default_storage_dir() -> PathBuf {
    if let Ok(dir) = env::var(STORAGE_DIR_ENV) {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    if let Some(documents) = dirs::document_dir() {
        return documents;
    }
    if let Some(data) = dirs::data_dir() {
        return data.join(APP_DIR_NAME);
    }
    env::temp_dir().join(APP_DIR_NAME)
}
