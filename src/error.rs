use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can terminate an invocation. Each failure carries the
/// input value that tripped it so the CLI can print a single descriptive
/// message and exit non-zero.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid path {path:?} for JUnitXML results file: {source}")]
    InvalidPath { path: PathBuf, source: io::Error },

    #[error("The file {path:?} does not contain valid XML: {reason}")]
    MalformedXml { path: PathBuf, reason: String },

    #[error("The file {path:?} does not have JUnitXML \"testsuite\" root element (found {found:?})")]
    WrongRootElement { path: PathBuf, found: String },

    #[error("Cannot write to {path:?} file: {source}")]
    WriteFailure { path: PathBuf, source: io::Error },

    #[error("The {0:?} environment variable is not defined! See help for more details.")]
    MissingCredential(&'static str),

    #[error("Failed to submit results to qTest: {0}")]
    Transport(String),
}
