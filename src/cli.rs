//! CLI argument parsing.
use clap::Parser;
use std::path::PathBuf;

/// Package a source folder as a LibreOffice extension (OXT).
#[derive(Parser, Debug)]
#[command(
    name = "oxtbuild",
    version,
    about = "Package a source folder as a LibreOffice extension (OXT)",
    after_help = "Writes META-INF/manifest.xml and description.xml into SOURCE_DIR, then <SOURCE_DIR>.oxt next to it.\n\nExamples:\n  oxtbuild my-ext\n  oxtbuild my-ext --guided\n  oxtbuild my-ext --strict --json"
)]
pub struct Args {
    /// Extension source folder
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Prompt for missing description.xml fields
    #[arg(short, long)]
    pub guided: bool,

    /// Only package .md, .txt, .xml and manifested file types
    #[arg(short, long)]
    pub strict: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,

    /// Log debug detail, including generated XML
    #[arg(short, long)]
    pub verbose: bool,
}
