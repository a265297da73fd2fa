//! Casemerge - batch processing of two-part scanned document sets
//!
//! Casemerge pairs `<id> S.pdf` cover/signature scans with their `<id>.pdf`
//! counterparts, merges each pair into a single `MT-<id>.pdf` (secondary
//! part first, always), and reports matched and incomplete sets. It also
//! converts Word documents to PDF through LibreOffice, naming each output
//! `MB-<id>.pdf` by the identifier found in the document content.

pub mod cli;
pub mod commands;
pub mod convert;
pub mod error;
pub mod merge;
pub mod models;
pub mod pairing;
pub mod report;
pub mod scan;

// Re-exports for convenience
pub use convert::{convert_directory, extract_identifier, CONVERT_PREFIX};
pub use error::{CasemergeError, CasemergeResult};
pub use merge::{merge_pairs, output_path, DocumentAppender, MergeBackend, PdfBackend, OUTPUT_PREFIX};
pub use models::{
    Convention, ConvertOutcome, ConvertStatus, MergeOutcome, MergeStatus, NamedDocument, Pair,
    Presence,
};
pub use pairing::{reconcile, Reconciliation};
pub use report::{RunReport, REPORT_FILE_NAME};
pub use scan::{match_convention, scan_directory, ScanResult};
