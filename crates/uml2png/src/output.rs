//! Colored progress reporting on stderr.

use std::path::Path;

use console::{Style, Term};

/// Terminal reporter for a conversion run.
pub(crate) struct Output {
    term: Term,
    ok: Style,
    warn: Style,
    err: Style,
    url: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            err: Style::new().red(),
            url: Style::new().cyan().bold(),
        }
    }

    fn line(&self, style: Option<&Style>, msg: &str) {
        let _ = match style {
            Some(style) => self.term.write_line(&style.apply_to(msg).to_string()),
            None => self.term.write_line(msg),
        };
    }

    /// A source file is about to be sent to the server.
    pub(crate) fn processing(&self, file_name: &str) {
        self.line(None, &format!("Processing {file_name}..."));
    }

    /// An image was written.
    pub(crate) fn created(&self, path: &Path) {
        self.line(Some(&self.ok), &format!("Created {}", path.display()));
    }

    /// Dry run URL for a source file.
    pub(crate) fn planned(&self, url: &str) {
        self.line(Some(&self.url), url);
    }

    /// A file was skipped; the run goes on.
    pub(crate) fn skipped(&self, msg: &str) {
        self.line(Some(&self.err), msg);
    }

    /// Nothing matched in the input directory.
    pub(crate) fn no_sources(&self, pattern: &str, dir: &Path) {
        self.line(
            Some(&self.warn),
            &format!("No {pattern} files found in {}", dir.display()),
        );
    }

    /// End-of-run summary, yellow when some files were skipped.
    pub(crate) fn summary(&self, line: &str, clean: bool) {
        let style = if clean { &self.ok } else { &self.warn };
        self.line(Some(style), line);
    }

    /// Fatal error.
    pub(crate) fn error(&self, msg: &str) {
        self.line(Some(&self.err), msg);
    }
}
