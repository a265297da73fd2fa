//! Error types for casemerge
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for casemerge operations
pub type CasemergeResult<T> = Result<T, CasemergeError>;

/// Main error type for casemerge operations
#[derive(Error, Debug)]
pub enum CasemergeError {
    /// Input directory does not exist
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Output directory cannot be created - fatal for the whole merge phase
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDirUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input document could not be opened or is not a valid PDF
    #[error("cannot open document {}: {message}", path.display())]
    DocumentOpen { path: PathBuf, message: String },

    /// Merged document could not be assembled or written
    #[error("cannot write merged document {}: {message}", path.display())]
    DocumentWrite { path: PathBuf, message: String },

    /// Word document container or XML is malformed
    #[error("invalid DOCX {}: {message}", path.display())]
    InvalidDocx { path: PathBuf, message: String },

    /// External converter failed for one document
    #[error("conversion failed for {}: {message}", path.display())]
    ConversionFailed { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
