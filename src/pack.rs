//! Archive assembly.
//!
//! A build regenerates the manifest, reconciles the description, zips the
//! selected files next to the source folder and then reopens the archive to
//! check that everything the package needs made it in.
use crate::description::reconcile;
use crate::error::BuildError;
use crate::files::{all_files, filter_files};
use crate::manifest::{generate_manifest, manifest_paths};
use crate::output::BuildReport;
use crate::paths::{ensure_source_dir, SourcePaths, MANIFEST_RELATIVE, REQUIRED_FILES};
use crate::prompt::Prompter;
use crate::schema::{DESCRIPTION_SCHEMA, MANIFEST_MEDIA_TYPES, STRICT_EXTENSIONS};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Package only allow-listed file types.
    pub strict: bool,
}

/// Package `source_dir` as `<name>.oxt` beside it.
pub fn build(
    source_dir: &Path,
    options: BuildOptions,
    prompter: Option<&mut dyn Prompter>,
) -> Result<BuildReport> {
    let paths = SourcePaths::new(ensure_source_dir(source_dir)?);
    let archive_path = paths.oxt_path()?;

    let manifest_entries = generate_manifest(&paths.manifest_path(), MANIFEST_MEDIA_TYPES)?;
    let outcome = reconcile(&paths.description_path(), &DESCRIPTION_SCHEMA, prompter)?;
    if !outcome.incomplete.is_empty() {
        tracing::warn!(
            fields = %outcome.incomplete.join(", "),
            "description.xml has incomplete fields; fill them in or rerun with --guided"
        );
    }

    let files = select_files(&paths, options.strict);
    let entries = write_archive(&paths, &files, &archive_path)?;
    verify_archive(&archive_path)?;
    tracing::info!(entries = entries.len(), "wrote {}", archive_path.display());

    Ok(BuildReport {
        source_dir: paths.root().to_path_buf(),
        archive: archive_path,
        strict: options.strict,
        description: outcome.state,
        incomplete: outcome.incomplete,
        manifest: manifest_entries,
        entries,
    })
}

fn select_files(paths: &SourcePaths, strict: bool) -> Vec<PathBuf> {
    if !strict {
        return all_files(paths.root());
    }
    let extensions: Vec<&str> = STRICT_EXTENSIONS
        .iter()
        .copied()
        .chain(MANIFEST_MEDIA_TYPES.iter().map(|(extension, _)| *extension))
        .collect();
    filter_files(&extensions, paths.root())
}

/// Write `files` as a deflated zip and return the entry names in archive
/// order.
fn write_archive(
    paths: &SourcePaths,
    files: &[PathBuf],
    archive_path: &Path,
) -> Result<Vec<String>> {
    let by_name: BTreeMap<String, &PathBuf> = files
        .iter()
        .filter(|path| path.is_file())
        .filter_map(|path| Some((paths.entry_name(path)?, path)))
        .collect();

    let file = File::create(archive_path)
        .with_context(|| format!("create {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, path) in &by_name {
        zip.start_file(name.clone(), options)
            .with_context(|| format!("add {name} to archive"))?;
        let mut source = File::open(path).with_context(|| format!("open {}", path.display()))?;
        io::copy(&mut source, &mut zip).with_context(|| format!("compress {}", path.display()))?;
        tracing::debug!(entry = %name, "archived");
    }
    zip.finish()
        .with_context(|| format!("finish {}", archive_path.display()))?;
    Ok(by_name.into_keys().collect())
}

/// Check the required descriptors and every manifested file are present;
/// the first missing entry is an error.
pub fn verify_archive(archive_path: &Path) -> Result<()> {
    let file =
        File::open(archive_path).with_context(|| format!("open {}", archive_path.display()))?;
    let mut archive =
        ZipArchive::new(file).with_context(|| format!("read {}", archive_path.display()))?;
    let names: BTreeSet<String> = archive.file_names().map(str::to_string).collect();

    for required in REQUIRED_FILES {
        if !names.contains(*required) {
            return Err(BuildError::MissingFromArchive(required.to_string()).into());
        }
    }

    let mut manifest = String::new();
    archive
        .by_name(MANIFEST_RELATIVE)
        .with_context(|| format!("open archived {MANIFEST_RELATIVE}"))?
        .read_to_string(&mut manifest)
        .with_context(|| format!("read archived {MANIFEST_RELATIVE}"))?;
    for listed in manifest_paths(&manifest)? {
        if !names.contains(&listed) {
            return Err(BuildError::MissingFromArchive(listed).into());
        }
    }
    Ok(())
}
