use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;

use super::error::{ParseError, RuleDocumentError};
use super::types::{EvaluatedRule, LoadedRules, Rule, RuleOrigin, RuleRecord};
use crate::config::CleanerConfig;

const HINT_CONTENT: &str = "\
Custom cleanup rules
====================

Put a file named Rule.json next to this one to replace the built-in rules.
It must be a JSON array; each entry looks like:

  {
    \"path\": \"/var/mobile/Library/Caches/com.tigisoftware.Filza\",
    \"description\": \"Filza cache\",
    \"isSelected\": true
  }

path         absolute path of a file or folder to delete, or a URL scheme such as Filza://
description  text shown under the path
isSelected   whether the entry is ticked when the app starts

URL schemes are only checked, never deleted.
Delete Rule.json to go back to the built-in rules.
";

lazy_static! {
    /// Built-in rules. Paths from the Reveil3 residue database.
    static ref DEFAULT_RULES: Vec<Rule> = vec![
        Rule::literal("Filza://", "Filza URL Scheme", true),
        Rule::localized("/var/mobile/Library/Caches/com.tigisoftware.Filza", "Rule_1", true),
        Rule::localized(
            "/var/mobile/Library/SplashBoard/Snapshots/com.tigisoftware.Filza",
            "Rule_2",
            true,
        ),
        Rule::localized(
            "/var/mobile/Library/Application Support/Containers/com.tigisoftware.Filza",
            "Rule_3",
            true,
        ),
        Rule::localized(
            "/var/mobile/Library/Saved Application State/com.tigisoftware.Filza.savedState",
            "Rule_4",
            true,
        ),
        Rule::localized("/var/mobile/Library/HTTPStorages/com.tigisoftware.Filza", "Rule_5", true),
        Rule::localized("/var/mobile/Library/Filza", "Rule_6", false),
        Rule::localized(
            "/var/mobile/Library/Preferences/com.tigisoftware.Filza.plist",
            "Rule_7",
            false,
        ),
    ];
}

/// The built-in rule table, in display order.
pub fn default_rules() -> Vec<Rule> {
    DEFAULT_RULES.clone()
}

/// Reads the user rule document and falls back to the built-in table.
#[derive(Debug, Clone)]
pub struct RuleSource {
    rule_file: PathBuf,
    hint_file: PathBuf,
}

impl RuleSource {
    pub fn new(config: &CleanerConfig) -> Self {
        RuleSource {
            rule_file: config.rule_file_path(),
            hint_file: config.hint_file_path(),
        }
    }

    pub fn rule_file(&self) -> &Path {
        &self.rule_file
    }

    pub fn hint_file(&self) -> &Path {
        &self.hint_file
    }

    /// Load the user document when present, otherwise the defaults.
    ///
    /// Always makes sure the hint file exists first, whatever the outcome.
    pub fn load(&self) -> Result<LoadedRules, ParseError> {
        self.ensure_hint_file();

        if !self.rule_file.exists() {
            log::debug!(
                "No rule document at {}, using built-in rules",
                self.rule_file.display()
            );
            return Ok(LoadedRules {
                rules: default_rules(),
                origin: RuleOrigin::Default,
            });
        }

        let rules = read_rule_document(&self.rule_file)?;
        log::debug!(
            "Loaded {} user rules from {}",
            rules.len(),
            self.rule_file.display()
        );
        Ok(LoadedRules {
            rules,
            origin: RuleOrigin::User,
        })
    }

    /// Like [`load`](Self::load), but a broken document degrades to the defaults.
    /// The parse error is handed back so the caller can tell the user once.
    pub fn load_or_default(&self) -> (LoadedRules, Option<ParseError>) {
        match self.load() {
            Ok(loaded) => (loaded, None),
            Err(err) => {
                log::warn!("{}; falling back to built-in rules", err);
                let loaded = LoadedRules {
                    rules: default_rules(),
                    origin: RuleOrigin::Default,
                };
                (loaded, Some(err))
            }
        }
    }

    /// Create the hint file if it is missing. Returns true when it exists afterwards.
    /// Failures are logged and otherwise ignored.
    pub fn ensure_hint_file(&self) -> bool {
        if let Some(parent) = self.hint_file.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                log::warn!(
                    "Failed to create rule directory {}: {}",
                    parent.display(),
                    err
                );
                return false;
            }
        }

        let created = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.hint_file)
            .and_then(|mut file| file.write_all(HINT_CONTENT.as_bytes()));

        match created {
            Ok(()) => true,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => true,
            Err(err) => {
                log::warn!(
                    "Failed to create hint file {}: {}",
                    self.hint_file.display(),
                    err
                );
                false
            }
        }
    }

    /// Persist the current rules (and their selection) as the user document.
    /// Localized descriptions are written as the text `lookup` resolves them to.
    pub fn save<F>(&self, rules: &[EvaluatedRule], lookup: F) -> Result<(), RuleDocumentError>
    where
        F: Fn(&str) -> String,
    {
        let records: Vec<RuleRecord> = rules.iter().map(|r| r.to_record(&lookup)).collect();
        write_records(&self.rule_file, &records)
    }
}

/// Parse a rule document. Localization keys and existence flags are reset.
pub fn read_rule_document(path: &Path) -> Result<Vec<Rule>, ParseError> {
    let raw = fs::read_to_string(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<RuleRecord> =
        serde_json::from_str(&raw).map_err(|source| ParseError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            Rule::from_user_record(record).ok_or_else(|| ParseError::EmptyPath {
                path: path.to_path_buf(),
                index,
            })
        })
        .collect()
}

/// Write rules in the document format, using each rule's own selection.
/// Localization keys are resolved through `lookup`.
pub fn write_rule_document<F>(
    path: &Path,
    rules: &[Rule],
    lookup: F,
) -> Result<(), RuleDocumentError>
where
    F: Fn(&str) -> String,
{
    let records: Vec<RuleRecord> = rules
        .iter()
        .map(|rule| rule.to_record(rule.is_selected(), &lookup))
        .collect();
    write_records(path, &records)
}

fn write_records(path: &Path, records: &[RuleRecord]) -> Result<(), RuleDocumentError> {
    let data = serde_json::to_vec_pretty(records)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| RuleDocumentError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, data).map_err(|source| RuleDocumentError::Write {
        path: path.to_path_buf(),
        source,
    })
}
