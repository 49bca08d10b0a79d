use crate::error::BuildError;
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

pub const MANIFEST_RELATIVE: &str = "META-INF/manifest.xml";
pub const DESCRIPTION_RELATIVE: &str = "description.xml";

/// Entries every archive must contain.
pub const REQUIRED_FILES: &[&str] = &[MANIFEST_RELATIVE, DESCRIPTION_RELATIVE];

/// Layout of an extension source folder and its archive.
#[derive(Debug, Clone)]
pub struct SourcePaths {
    root: PathBuf,
}

impl SourcePaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_RELATIVE)
    }

    pub fn description_path(&self) -> PathBuf {
        self.root.join(DESCRIPTION_RELATIVE)
    }

    /// `<name>.oxt` next to the source folder.
    pub fn oxt_path(&self) -> Result<PathBuf> {
        let name = self
            .root
            .file_name()
            .ok_or_else(|| anyhow!("source folder {} has no name", self.root.display()))?;
        let mut file_name = name.to_os_string();
        file_name.push(".oxt");
        Ok(self.root.with_file_name(file_name))
    }

    /// Archive entry name for a file under the root, `/`-separated.
    pub fn entry_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect();
        Some(parts.join("/"))
    }
}

/// Canonical path of an existing source folder.
pub fn ensure_source_dir(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(BuildError::NotADirectory(path.to_path_buf()).into());
    }
    path.canonicalize()
        .map_err(|_| BuildError::NotADirectory(path.to_path_buf()).into())
}
