//! `casemerge convert` - Word-to-PDF conversion

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use crate::convert::convert_directory;
use crate::models::{ConvertOutcome, ConvertStatus};

/// Convert every Word document in the input directory.
///
/// Per-file failures are printed and counted but do not fail the run.
pub fn run(input: &Path, output: &Path, soffice: &str, json: bool) -> Result<()> {
    let outcomes = convert_directory(soffice, input, output)?;

    if json {
        println!("{}", render_json(&outcomes)?);
        return Ok(());
    }

    for outcome in &outcomes {
        let source = outcome.source.display();
        match &outcome.status {
            ConvertStatus::Converted { output } => {
                if outcome.identifier.is_none() {
                    println!("\u{26a0} {source}: no identifier found, using file name");
                }
                println!("\u{2714} {source} \u{2192} {}", output.display());
            }
            ConvertStatus::Failed(message) => {
                println!("\u{2717} {source}: {message}");
            }
        }
    }

    let converted = outcomes
        .iter()
        .filter(|o| matches!(o.status, ConvertStatus::Converted { .. }))
        .count();
    let failed = outcomes.len() - converted;
    println!("\nConverted: {converted}");
    if failed > 0 {
        println!("Failed: {failed}");
    }
    println!("Output directory: {}", output.display());
    Ok(())
}

fn render_json(outcomes: &[ConvertOutcome]) -> Result<String> {
    let documents: Vec<_> = outcomes
        .iter()
        .map(|outcome| {
            let (converted, output, error) = match &outcome.status {
                ConvertStatus::Converted { output } => {
                    (true, Some(output.display().to_string()), None)
                }
                ConvertStatus::Failed(message) => (false, None, Some(message.clone())),
            };
            json!({
                "source": outcome.source.display().to_string(),
                "identifier": outcome.identifier,
                "converted": converted,
                "output": output,
                "error": error,
            })
        })
        .collect();

    let converted = outcomes
        .iter()
        .filter(|o| matches!(o.status, ConvertStatus::Converted { .. }))
        .count();
    let payload = json!({
        "documents": documents,
        "converted": converted,
        "failed": outcomes.len() - converted,
    });
    Ok(serde_json::to_string_pretty(&payload)?)
}
