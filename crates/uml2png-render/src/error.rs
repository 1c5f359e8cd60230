//! Fatal rendering errors.

use std::path::PathBuf;

/// Error that aborts a whole batch.
///
/// Per-file server failures are reported through
/// [`FileFailure`](crate::FileFailure) instead.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Source file pattern is not a valid glob.
    #[error("invalid source pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    /// Input directory could not be listed.
    #[error("cannot read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Source file could not be read as UTF-8 text.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Output directory could not be created.
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Rendered image could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
