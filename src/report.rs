//! Run report rendering
//!
//! One report per invocation, in fixed section order: timestamp, matched
//! pairs, incomplete entries, summary. The console rendering and the
//! persisted `report.txt` carry identical information; the console may
//! add trailing metadata (the report file path). A JSON rendering of the
//! same information backs the global `--json` flag.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::CasemergeResult;
use crate::models::{MergeOutcome, MergeStatus};
use crate::pairing::Reconciliation;

/// Fixed name of the persisted report artifact, written into the output
/// directory and overwritten on each run.
pub const REPORT_FILE_NAME: &str = "report.txt";

/// Snapshot of one run, ready to render.
pub struct RunReport<'a> {
    generated_at: DateTime<Local>,
    recon: &'a Reconciliation,
    outcomes: &'a [MergeOutcome],
    output_dir: &'a Path,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    pairs: Vec<JsonPair<'a>>,
    incomplete: Vec<JsonIncomplete<'a>>,
    files_generated: usize,
    failed_merges: usize,
    output_dir: String,
}

#[derive(Serialize)]
struct JsonPair<'a> {
    identifier: &'a str,
    secondary: String,
    primary: String,
    merged: bool,
    output: Option<String>,
    error: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonIncomplete<'a> {
    identifier: &'a str,
    has_secondary: bool,
    has_primary: bool,
}

impl<'a> RunReport<'a> {
    pub fn new(
        recon: &'a Reconciliation,
        outcomes: &'a [MergeOutcome],
        output_dir: &'a Path,
    ) -> Self {
        Self {
            generated_at: Local::now(),
            recon,
            outcomes,
            output_dir,
        }
    }

    /// Number of pairs merged successfully
    pub fn merged_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_merged()).count()
    }

    /// Number of pairs whose merge failed
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_merged()).count()
    }

    fn outcome_for(&self, identifier: &str) -> Option<&MergeOutcome> {
        self.outcomes.iter().find(|o| o.identifier == identifier)
    }

    /// Render the full text report, shared by console and `report.txt`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Report generated: {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));

        out.push_str("\n=== MATCHED PAIRS ===\n");
        for (identifier, pair) in &self.recon.pairs {
            out.push_str(&format!(
                "\u{2714} {identifier} \u{2192} {} + {}",
                pair.secondary_name(),
                pair.primary_name()
            ));
            if let Some(MergeOutcome {
                status: MergeStatus::Failed(message),
                ..
            }) = self.outcome_for(identifier)
            {
                out.push_str(&format!(" (merge failed: {message})"));
            }
            out.push('\n');
        }

        out.push_str("\n=== INCOMPLETE SETS ===\n");
        if self.recon.incomplete.is_empty() {
            out.push_str("No incomplete sets.\n");
        } else {
            for (identifier, presence) in &self.recon.incomplete {
                out.push_str(&format!(
                    "{identifier}: secondary[{}]  primary[{}]\n",
                    flag(presence.has_secondary),
                    flag(presence.has_primary)
                ));
            }
        }

        out.push_str("\n=== SUMMARY ===\n");
        if self.recon.pairs.is_empty() {
            out.push_str("No complete pairs found to merge.\n");
        } else {
            out.push_str(&format!("Files generated: {}\n", self.merged_count()));
            if self.failed_count() > 0 {
                out.push_str(&format!("Failed merges: {}\n", self.failed_count()));
            }
            out.push_str(&format!(
                "Output directory: {}\n",
                self.output_dir.display()
            ));
        }
        out
    }

    /// Render the same information as a JSON document.
    pub fn render_json(&self) -> CasemergeResult<String> {
        let payload = JsonReport {
            generated_at: self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            pairs: self
                .recon
                .pairs
                .iter()
                .map(|(identifier, pair)| {
                    let outcome = self.outcome_for(identifier);
                    let merged = outcome.map(MergeOutcome::is_merged).unwrap_or(false);
                    JsonPair {
                        identifier: identifier.as_str(),
                        secondary: pair.secondary_name(),
                        primary: pair.primary_name(),
                        merged,
                        output: outcome
                            .filter(|o| o.is_merged())
                            .map(|o| o.output.display().to_string()),
                        error: outcome.and_then(|o| match &o.status {
                            MergeStatus::Failed(message) => Some(message.as_str()),
                            MergeStatus::Merged => None,
                        }),
                    }
                })
                .collect(),
            incomplete: self
                .recon
                .incomplete
                .iter()
                .map(|(identifier, presence)| JsonIncomplete {
                    identifier: identifier.as_str(),
                    has_secondary: presence.has_secondary,
                    has_primary: presence.has_primary,
                })
                .collect(),
            files_generated: self.merged_count(),
            failed_merges: self.failed_count(),
            output_dir: self.output_dir.display().to_string(),
        };
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    /// Persist the text report into the output directory, overwriting any
    /// previous run's file. Returns the path written.
    pub fn write(&self) -> CasemergeResult<PathBuf> {
        let path = self.output_dir.join(REPORT_FILE_NAME);
        fs::write(&path, self.render())?;
        Ok(path)
    }
}

fn flag(present: bool) -> char {
    if present {
        '\u{2714}'
    } else {
        '\u{2717}'
    }
}
