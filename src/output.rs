//! Build result reporting.
use crate::description::DescriptionState;
use crate::manifest::ManifestEntry;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

/// What a build produced.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub source_dir: PathBuf,
    pub archive: PathBuf,
    pub strict: bool,
    pub description: DescriptionState,
    /// Description fields still holding the placeholder.
    pub incomplete: Vec<String>,
    pub manifest: Vec<ManifestEntry>,
    /// Archive entry names in archive order.
    pub entries: Vec<String>,
}

pub fn print_report(report: &BuildReport, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("serialize build report")?;
        println!("{text}");
        return Ok(());
    }
    println!("wrote {}", report.archive.display());
    Ok(())
}
