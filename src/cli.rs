use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Casemerge - batch pairing/merging of scanned PDF sets and Word-to-PDF
/// conversion
#[derive(Parser, Debug)]
#[command(name = "casemerge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pair `<id> S.pdf` + `<id>.pdf` files and merge each pair into
    /// `MT-<id>.pdf`
    Merge {
        /// Directory containing the scanned input PDFs
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for merged outputs and the run report
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert Word documents to PDF, named `MB-<id>.pdf` by the
    /// identifier found in each document
    Convert {
        /// Directory containing the .docx files
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the converted PDFs
        #[arg(short, long)]
        output: PathBuf,

        /// Path to the LibreOffice binary
        #[arg(long, default_value = "soffice")]
        soffice: String,
    },
}
