//! Fatal conditions the packaging workflow reports by name.
//!
//! Anything else (I/O, zip plumbing) travels as `anyhow::Error` with context.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("{}: {detail}", path.display())]
    XmlParse { path: PathBuf, detail: String },

    #[error("{}: unexpected root element <{found}>, expected <{expected}>", path.display())]
    UnexpectedRoot {
        path: PathBuf,
        found: String,
        expected: String,
    },

    #[error("Interrupted with Ctrl+C")]
    Interrupted,

    #[error("Required file missing: {0}")]
    MissingFromArchive(String),
}
