use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::error::DeletionError;
use super::types::EvaluatedRule;

/// Candidates computed from the current selection, awaiting confirmation.
///
/// Building a plan touches nothing on disk; only [`commit`] does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionPlan {
    candidates: Vec<PathBuf>,
}

impl DeletionPlan {
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// What a successful commit did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub removed: Vec<PathBuf>,
    /// Selected but already gone; counted as success.
    pub already_absent: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoveOutcome {
    Removed,
    Absent,
}

/// Number of selected path rules. Scheme rules never count.
pub fn selected_count(rules: &[EvaluatedRule]) -> usize {
    rules.iter().filter(|r| r.is_deletion_candidate()).count()
}

/// Selected path rules, in input order.
pub fn request_deletion(rules: &[EvaluatedRule]) -> DeletionPlan {
    DeletionPlan {
        candidates: rules
            .iter()
            .filter(|r| r.is_deletion_candidate())
            .map(|r| PathBuf::from(r.path()))
            .collect(),
    }
}

/// Remove every candidate in order, stopping at the first failure.
///
/// Nothing is rolled back: entries removed before the failure stay removed
/// and later candidates are not attempted. Re-probe afterwards.
pub fn commit(plan: DeletionPlan) -> Result<DeletionReport, DeletionError> {
    let mut report = DeletionReport::default();

    for path in plan.candidates {
        match remove_entry(&path) {
            Ok(RemoveOutcome::Removed) => {
                log::debug!("Removed {}", path.display());
                report.removed.push(path);
            }
            Ok(RemoveOutcome::Absent) => {
                log::debug!("Already absent: {}", path.display());
                report.already_absent.push(path);
            }
            Err(source) => {
                log::warn!("Failed to remove {}: {}", path.display(), source);
                return Err(DeletionError {
                    path,
                    removed: report.removed,
                    source,
                });
            }
        }
    }

    log::info!(
        "Deletion finished: {} removed, {} already absent",
        report.removed.len(),
        report.already_absent.len()
    );
    Ok(report)
}

/// Plan and commit in one step.
pub fn delete_selected(rules: &[EvaluatedRule]) -> Result<DeletionReport, DeletionError> {
    commit(request_deletion(rules))
}

fn remove_entry(path: &Path) -> io::Result<RemoveOutcome> {
    // Presence follows links, same as the prober: a dangling link is absent.
    match fs::metadata(path) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RemoveOutcome::Absent),
        Err(e) => return Err(e),
    }

    // lstat picks the removal: a live link is unlinked, its target left alone
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RemoveOutcome::Absent),
        Err(e) => return Err(e),
    };

    let res = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match res {
        Ok(()) => Ok(RemoveOutcome::Removed),
        // vanished between the check and the removal
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(RemoveOutcome::Absent),
        Err(e) => Err(e),
    }
}
