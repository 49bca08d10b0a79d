//! Source tree enumeration.
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files under `root` whose name ends with one of `extensions`.
///
/// Results are grouped by extension in the order given, each group in
/// sorted walk order. A file matching two extensions appears twice.
/// Unreadable entries are skipped and a missing root yields nothing.
pub fn filter_files(extensions: &[&str], root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for extension in extensions {
        files.extend(
            regular_files(root).filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(extension))
            }),
        );
    }
    files
}

/// Every regular file under `root`, sorted.
pub fn all_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = regular_files(root).collect();
    files.sort();
    files
}

fn regular_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}
