//! Error types. Whole-run failures are [`GenerateError`]; per-type failures are
//! [`AnalyzeError`], which the analyzer logs and swallows.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("could not read symbol snapshot {}: {source}", .path.display())]
    ReadSnapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse symbol snapshot {}: {source}", .path.display())]
    ParseSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize api document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("notification stream closed: {0}")]
    Stream(#[source] std::io::Error),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    #[error("type symbol has no name")]
    MissingName,

    #[error("delegate {0} has no invoke signature")]
    MissingInvoke(String),

    #[error("member of {0} has no name")]
    UnnamedMember(String),
}
