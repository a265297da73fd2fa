//! Input scanning for the merge pipeline
//!
//! Matches directory entries against the two filename conventions and
//! collects identifier-to-path maps for the reconciler.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CasemergeError, CasemergeResult};
use crate::models::{Convention, NamedDocument};

/// Bare digits plus `.pdf`, e.g. `123.pdf`
static RE_PRIMARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([0-9]+)\.pdf$").expect("primary pattern compiles"));

/// Digits, whitespace run, marker letter `S`, `.pdf`, e.g. `123 S.pdf`
static RE_SECONDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([0-9]+)\s+S\.pdf$").expect("secondary pattern compiles"));

/// Match a filename against the two conventions.
///
/// The patterns are structurally disjoint (the secondary form requires a
/// whitespace run and the marker letter), so a name matches at most one.
/// Returns the raw digit string unchanged - `"007.pdf"` yields `"007"`.
pub fn match_convention(name: &str) -> Option<(String, Convention)> {
    if let Some(caps) = RE_PRIMARY.captures(name) {
        return Some((caps[1].to_string(), Convention::Primary));
    }
    if let Some(caps) = RE_SECONDARY.captures(name) {
        return Some((caps[1].to_string(), Convention::Secondary));
    }
    None
}

/// Identifier-to-path maps for the two conventions, as found in one
/// directory snapshot.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub primary: BTreeMap<String, PathBuf>,
    pub secondary: BTreeMap<String, PathBuf>,
}

impl ScanResult {
    /// Total number of matched input files
    pub fn matched_files(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }
}

/// Scan a directory for files matching either convention.
///
/// Non-matching entries (including subdirectories and non-UTF-8 names) are
/// ignored. If the directory contains duplicate identifiers under the same
/// convention, the last entry seen wins; directory iteration order is
/// platform-defined, so such input is inherently ambiguous.
pub fn scan_directory(dir: &Path) -> CasemergeResult<ScanResult> {
    if !dir.is_dir() {
        return Err(CasemergeError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut result = ScanResult::default();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some((identifier, convention)) = match_convention(name) {
            let doc = NamedDocument::new(identifier, convention, path);
            let map = match doc.convention {
                Convention::Primary => &mut result.primary,
                Convention::Secondary => &mut result.secondary,
            };
            map.insert(doc.identifier, doc.path);
        }
    }
    Ok(result)
}
