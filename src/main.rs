//! Casemerge CLI
//!
//! Usage: casemerge <COMMAND>
//!
//! Commands:
//!   merge    Pair and merge two-part scanned PDF sets
//!   convert  Convert Word documents to PDF named by document identifier

use anyhow::Result;
use clap::Parser;

use casemerge::cli::{Cli, Commands};
use casemerge::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge { input, output } => commands::merge::run(&input, &output, cli.json),
        Commands::Convert {
            input,
            output,
            soffice,
        } => commands::convert::run(&input, &output, &soffice, cli.json),
    }
}
