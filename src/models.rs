//! Core data models for casemerge
//!
//! Defines the fundamental data structures used throughout casemerge:
//! - `Convention`: which of the two filename patterns a scan matched
//! - `NamedDocument`: a matched input file with its extracted identifier
//! - `Pair` / `Presence`: complete and incomplete reconciliation entries
//! - `MergeOutcome` / `ConvertOutcome`: per-document processing results

use std::path::PathBuf;

/// Which filename convention an input file matched.
///
/// The secondary document is the cover/signature part and always comes
/// first in the merged output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// Bare digits plus extension, e.g. `123.pdf`
    Primary,
    /// Digits, whitespace, marker letter, extension, e.g. `123 S.pdf`
    Secondary,
}

/// A scanned input file whose name matched one of the conventions.
///
/// Immutable once created; the identifier is the raw matched digit string
/// with no re-formatting (leading zeros are preserved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedDocument {
    pub identifier: String,
    pub convention: Convention,
    pub path: PathBuf,
}

impl NamedDocument {
    pub fn new(
        identifier: impl Into<String>,
        convention: Convention,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            convention,
            path: path.into(),
        }
    }
}

/// A complete pair: both conventions present for one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    /// Cover/signature part, merged first
    pub secondary: PathBuf,
    /// Main part, merged second
    pub primary: PathBuf,
}

impl Pair {
    /// Display name of the secondary input file
    pub fn secondary_name(&self) -> String {
        file_name(&self.secondary)
    }

    /// Display name of the primary input file
    pub fn primary_name(&self) -> String {
        file_name(&self.primary)
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Which sides were found for an identifier that could not be paired.
///
/// Invariant: at least one flag is false - an entry with both sides
/// present is promoted to a `Pair` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub has_secondary: bool,
    pub has_primary: bool,
}

/// Result of merging one complete pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub identifier: String,
    pub output: PathBuf,
    pub status: MergeStatus,
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self.status, MergeStatus::Merged)
    }
}

/// Status of a single merge operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStatus {
    Merged,
    Failed(String),
}

/// Result of converting one Word document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOutcome {
    pub source: PathBuf,
    /// Identifier extracted from document content; `None` means the
    /// file stem was used as a fallback
    pub identifier: Option<String>,
    pub status: ConvertStatus,
}

/// Status of a single conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertStatus {
    Converted { output: PathBuf },
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_names_use_file_names() {
        let pair = Pair {
            secondary: PathBuf::from("/in/10 S.pdf"),
            primary: PathBuf::from("/in/10.pdf"),
        };
        assert_eq!(pair.secondary_name(), "10 S.pdf");
        assert_eq!(pair.primary_name(), "10.pdf");
    }

    #[test]
    fn merge_outcome_status() {
        let ok = MergeOutcome {
            identifier: "10".to_string(),
            output: PathBuf::from("/out/MT-10.pdf"),
            status: MergeStatus::Merged,
        };
        let bad = MergeOutcome {
            identifier: "11".to_string(),
            output: PathBuf::from("/out/MT-11.pdf"),
            status: MergeStatus::Failed("boom".to_string()),
        };
        assert!(ok.is_merged());
        assert!(!bad.is_merged());
    }
}
