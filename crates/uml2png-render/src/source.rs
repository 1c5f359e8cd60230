//! Discovery of diagram source files.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::RenderError;

/// Extension of rendered output files.
const OUTPUT_EXTENSION: &str = "png";

/// A diagram source file found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Full path to the source file.
    pub path: PathBuf,
    /// File name including extension (e.g., `a.puml`).
    pub file_name: String,
    /// File name without the last extension (e.g., `a`).
    pub stem: String,
}

impl SourceFile {
    /// Build from a path, returning `None` if the name is not valid UTF-8.
    fn from_path(path: PathBuf) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_owned();
        let stem = path.file_stem()?.to_str()?.to_owned();
        Some(Self {
            path,
            file_name,
            stem,
        })
    }

    /// Name of the rendered image for this source (e.g., `a.png`).
    #[must_use]
    pub fn output_name(&self) -> String {
        format!("{}.{OUTPUT_EXTENSION}", self.stem)
    }
}

/// List regular files in `dir` whose name matches `pattern`.
///
/// Not recursive. A leading dot is not special, so `*.puml` also matches
/// `.draft.puml`. Results are sorted by file name.
pub fn discover_sources(dir: &Path, pattern: &Pattern) -> Result<Vec<SourceFile>, RenderError> {
    let options = MatchOptions::new();
    let read_dir_error = |source| RenderError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut sources = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        // Follows symlinks.
        if !path.is_file() {
            continue;
        }
        let path_display = path.display().to_string();
        let Some(source) = SourceFile::from_path(path) else {
            tracing::warn!(path = %path_display, "Skipping file with non-UTF-8 name");
            continue;
        };
        if pattern.matches_with(&source.file_name, options) {
            sources.push(source);
        }
    }

    sources.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(sources)
}
