use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The user rule document exists but could not be turned into rules.
///
/// Recoverable: callers show the message once and fall back to the built-in rules.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read rule document {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse rule document {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("rule #{index} in {} has an empty path", path.display())]
    EmptyPath { path: PathBuf, index: usize },
}

/// First candidate that could not be removed. Earlier candidates stay removed.
#[derive(Debug, Error)]
#[error("failed to remove {}: {source}", path.display())]
pub struct DeletionError {
    pub path: PathBuf,
    /// Candidates removed before the failure.
    pub removed: Vec<PathBuf>,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum RuleDocumentError {
    #[error("failed to encode rule document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write rule document {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
