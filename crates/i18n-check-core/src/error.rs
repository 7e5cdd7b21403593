//! Analysis error and configuration-warning types.

use std::path::PathBuf;
use thiserror::Error;

pub type AnalyzeResult<T> = Result<T, AnalyzeError>;

/// Errors surfaced by the analysis engine.
///
/// Per-file I/O failures are reported through the analyzer log and do not
/// abort a batch run; these variants exist for callers driving single
/// operations (e.g. pseudo-translating one catalog).
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type: {path}")]
    UnsupportedFileType { path: PathBuf },
}

/// A non-fatal configuration problem.
///
/// Bad patterns are dropped and analysis proceeds; the warning is kept so
/// callers can log it (the CLI prints these before the run starts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// The offending configuration value (e.g. the regex source).
    pub value: String,
    /// Description of the problem.
    pub message: String,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ignoring '{}': {}", self.value, self.message)
    }
}
