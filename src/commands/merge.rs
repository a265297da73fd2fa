//! `casemerge merge` - the pairing-and-merge pipeline

use std::path::Path;

use anyhow::Result;

use crate::merge::{merge_pairs, PdfBackend};
use crate::pairing::reconcile;
use crate::report::RunReport;
use crate::scan::scan_directory;

/// Scan, reconcile, merge, report.
///
/// Per-pair merge failures end up in the report and do not fail the run.
/// An unusable output directory is fatal, but the pairing information
/// already computed is printed before the error propagates.
pub fn run(input: &Path, output: &Path, json: bool) -> Result<()> {
    let scanned = scan_directory(input)?;
    let recon = reconcile(scanned.primary, scanned.secondary);

    let outcomes = match merge_pairs(&PdfBackend, &recon.pairs, output) {
        Ok(outcomes) => outcomes,
        Err(err) => {
            // Nothing was written; still surface what the scan found.
            let report = RunReport::new(&recon, &[], output);
            if json {
                println!("{}", report.render_json()?);
            } else {
                println!("{}", report.render());
            }
            return Err(err.into());
        }
    };

    let report = RunReport::new(&recon, &outcomes, output);
    let report_path = report.write()?;
    if json {
        println!("{}", report.render_json()?);
    } else {
        println!("{}", report.render());
        println!("Report written to {}", report_path.display());
    }
    Ok(())
}
