//! Sequential batch conversion of a source directory.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::RenderError;
use crate::server::{DiagramServer, FetchError};
use crate::source::{SourceFile, discover_sources};

/// Options controlling a batch.
#[derive(Debug, Clone)]
pub struct ConverterOptions {
    /// Glob matched against file names in the input directory.
    pub pattern: String,
    /// Output subdirectory name inside the input directory.
    pub output_dir_name: String,
    /// Compute URLs without contacting the server or writing files.
    pub dry_run: bool,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            pattern: "*.puml".to_owned(),
            output_dir_name: "sortie_png".to_owned(),
            dry_run: false,
        }
    }
}

/// Progress notification emitted while a batch runs.
#[derive(Debug)]
pub enum ConvertEvent<'a> {
    /// About to process a source file.
    Started { source: &'a SourceFile },
    /// Image written to `output`.
    Written {
        source: &'a SourceFile,
        output: &'a Path,
    },
    /// Dry run: the URL that would have been requested.
    Planned { source: &'a SourceFile, url: &'a str },
    /// Server failure; the file was skipped.
    Failed {
        source: &'a SourceFile,
        error: &'a FetchError,
    },
}

/// A source file that could not be rendered.
#[derive(Debug, thiserror::Error)]
#[error("{file_name}: {error}")]
pub struct FileFailure {
    /// Name of the skipped source file.
    pub file_name: String,
    /// Why the server did not produce an image.
    pub error: FetchError,
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Directory that receives images.
    pub output_dir: PathBuf,
    /// Number of matching source files.
    pub sources: usize,
    /// Images written, in processing order.
    pub written: Vec<PathBuf>,
    /// Dry run URLs, in processing order.
    pub planned: Vec<String>,
    /// Files skipped because of server failures.
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    /// Whether the input directory had no matching files.
    #[must_use]
    pub fn no_sources(&self) -> bool {
        self.sources == 0
    }
}

/// Renders every matching source file in a directory, one at a time.
pub struct Converter<S> {
    server: S,
    pattern: Pattern,
    options: ConverterOptions,
}

impl<S: DiagramServer> Converter<S> {
    /// Create a converter rendering through `server`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Pattern`] if `options.pattern` is not a valid glob.
    pub fn new(server: S, options: ConverterOptions) -> Result<Self, RenderError> {
        let pattern = Pattern::new(&options.pattern)?;
        Ok(Self {
            server,
            pattern,
            options,
        })
    }

    /// Convert all matching files in `input_dir`.
    ///
    /// The output directory is created only when there is something to write.
    /// Server failures are collected in [`BatchReport::failures`] and the batch
    /// moves on; I/O failures abort it.
    ///
    /// # Arguments
    /// * `input_dir` - Directory scanned for source files
    /// * `on_event` - Called as each file progresses
    pub fn convert_dir(
        &self,
        input_dir: &Path,
        mut on_event: impl FnMut(ConvertEvent<'_>),
    ) -> Result<BatchReport, RenderError> {
        let sources = discover_sources(input_dir, &self.pattern)?;
        let mut report = BatchReport {
            output_dir: input_dir.join(&self.options.output_dir_name),
            sources: sources.len(),
            ..BatchReport::default()
        };

        if sources.is_empty() {
            tracing::info!(dir = %input_dir.display(), "No source files found");
            return Ok(report);
        }

        if !self.options.dry_run {
            fs::create_dir_all(&report.output_dir).map_err(|source| RenderError::CreateDir {
                path: report.output_dir.clone(),
                source,
            })?;
        }

        for source in &sources {
            on_event(ConvertEvent::Started { source });
            self.convert_one(source, &mut report, &mut on_event)?;
        }

        tracing::info!(
            sources = report.sources,
            written = report.written.len(),
            failed = report.failures.len(),
            "Batch completed"
        );
        Ok(report)
    }

    fn convert_one(
        &self,
        source: &SourceFile,
        report: &mut BatchReport,
        on_event: &mut impl FnMut(ConvertEvent<'_>),
    ) -> Result<(), RenderError> {
        let text = fs::read_to_string(&source.path).map_err(|e| RenderError::Read {
            path: source.path.clone(),
            source: e,
        })?;
        let token = uml2png_encoding::encode(&text);

        if self.options.dry_run {
            let url = self.server.png_url(&token);
            on_event(ConvertEvent::Planned { source, url: &url });
            report.planned.push(url);
            return Ok(());
        }

        match self.server.fetch_png(&token) {
            Ok(data) => {
                let output = report.output_dir.join(source.output_name());
                fs::write(&output, &data).map_err(|e| RenderError::Write {
                    path: output.clone(),
                    source: e,
                })?;
                tracing::debug!(file = %source.file_name, bytes = data.len(), "Diagram written");
                on_event(ConvertEvent::Written {
                    source,
                    output: &output,
                });
                report.written.push(output);
            }
            Err(error) => {
                tracing::warn!(file = %source.file_name, error = %error, "Diagram skipped");
                on_event(ConvertEvent::Failed {
                    source,
                    error: &error,
                });
                report.failures.push(FileFailure {
                    file_name: source.file_name.clone(),
                    error,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory server keyed by decoded diagram source.
    #[derive(Default)]
    struct MockServer {
        responses: HashMap<String, Result<Vec<u8>, u16>>,
        requests: RefCell<Vec<String>>,
    }

    impl MockServer {
        fn respond(mut self, source: &str, response: Result<&[u8], u16>) -> Self {
            self.responses
                .insert(source.to_owned(), response.map(<[u8]>::to_vec));
            self
        }
    }

    impl DiagramServer for MockServer {
        fn png_url(&self, token: &str) -> String {
            format!("http://mock/png/{token}")
        }

        fn fetch_png(&self, token: &str) -> Result<Vec<u8>, FetchError> {
            let source = uml2png_encoding::decode(token).unwrap();
            self.requests.borrow_mut().push(source.clone());
            match self.responses.get(&source) {
                Some(Ok(data)) => Ok(data.clone()),
                Some(Err(status)) => Err(FetchError::Status { status: *status }),
                None => Err(FetchError::Connection("connection refused".to_owned())),
            }
        }
    }

    fn collect_events(
        converter: &Converter<MockServer>,
        dir: &Path,
    ) -> (Result<BatchReport, RenderError>, Vec<String>) {
        let mut events = Vec::new();
        let result = converter.convert_dir(dir, |event| {
            events.push(match event {
                ConvertEvent::Started { source } => format!("started {}", source.file_name),
                ConvertEvent::Written { source, .. } => format!("written {}", source.file_name),
                ConvertEvent::Planned { source, .. } => format!("planned {}", source.file_name),
                ConvertEvent::Failed { source, error } => {
                    format!("failed {}: {error}", source.file_name)
                }
            });
        });
        (result, events)
    }

    const DIAGRAM_A: &str = "@startuml\nAlice -> Bob : hello\n@enduml\n";
    const DIAGRAM_B: &str = "@startuml\nBob -> Alice : bye\n@enduml\n";

    #[test]
    fn test_convert_writes_response_bytes() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("a.puml"), DIAGRAM_A).unwrap();
        let server = MockServer::default().respond(DIAGRAM_A, Ok(b"\x89PNG-a"));
        let converter = Converter::new(server, ConverterOptions::default()).unwrap();

        let report = converter.convert_dir(temp_dir.path(), |_| {}).unwrap();

        let expected = temp_dir.path().join("sortie_png").join("a.png");
        assert_eq!(report.written, vec![expected.clone()]);
        assert!(report.failures.is_empty());
        assert_eq!(fs::read(expected).unwrap(), b"\x89PNG-a");
    }

    #[test]
    fn test_convert_skips_failed_file_and_continues() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("a.puml"), DIAGRAM_A).unwrap();
        fs::write(temp_dir.path().join("b.puml"), DIAGRAM_B).unwrap();
        fs::write(temp_dir.path().join("c.puml"), DIAGRAM_A).unwrap();
        let server = MockServer::default()
            .respond(DIAGRAM_A, Ok(b"png"))
            .respond(DIAGRAM_B, Err(500));
        let converter = Converter::new(server, ConverterOptions::default()).unwrap();

        let (result, events) = collect_events(&converter, temp_dir.path());
        let report = result.unwrap();

        let output_dir = temp_dir.path().join("sortie_png");
        assert!(!output_dir.join("b.png").exists());
        assert!(output_dir.join("a.png").exists());
        assert!(output_dir.join("c.png").exists());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].to_string(), "b.puml: HTTP status 500");
        assert_eq!(
            events,
            vec![
                "started a.puml",
                "written a.puml",
                "started b.puml",
                "failed b.puml: HTTP status 500",
                "started c.puml",
                "written c.puml",
            ]
        );
    }

    #[test]
    fn test_convert_connection_error_is_per_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("offline.puml"), "@startuml\n@enduml").unwrap();
        let converter = Converter::new(MockServer::default(), ConverterOptions::default()).unwrap();

        let report = converter.convert_dir(temp_dir.path(), |_| {}).unwrap();

        assert!(report.written.is_empty());
        assert!(matches!(
            report.failures[0].error,
            FetchError::Connection(_)
        ));
        assert!(report.failures[0].to_string().contains("offline.puml"));
    }

    #[test]
    fn test_convert_empty_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let converter = Converter::new(MockServer::default(), ConverterOptions::default()).unwrap();

        let (result, events) = collect_events(&converter, temp_dir.path());
        let report = result.unwrap();

        assert!(report.no_sources());
        assert!(events.is_empty());
        assert!(!temp_dir.path().join("sortie_png").exists());
        assert!(converter.server.requests.borrow().is_empty());
    }

    #[test]
    fn test_convert_sends_file_text_unchanged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let text = "@startuml\nAlice -> Bob : café ☕\n@enduml";
        fs::write(temp_dir.path().join("utf8.puml"), text).unwrap();
        let server = MockServer::default().respond(text, Ok(b"png"));
        let converter = Converter::new(server, ConverterOptions::default()).unwrap();

        converter.convert_dir(temp_dir.path(), |_| {}).unwrap();

        assert_eq!(*converter.server.requests.borrow(), vec![text.to_owned()]);
    }

    #[test]
    fn test_convert_overwrites_existing_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("a.puml"), DIAGRAM_A).unwrap();
        let output_dir = temp_dir.path().join("sortie_png");
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("a.png"), b"stale").unwrap();
        let server = MockServer::default().respond(DIAGRAM_A, Ok(b"fresh"));
        let converter = Converter::new(server, ConverterOptions::default()).unwrap();

        converter.convert_dir(temp_dir.path(), |_| {}).unwrap();

        assert_eq!(fs::read(output_dir.join("a.png")).unwrap(), b"fresh");
    }

    #[test]
    fn test_convert_renders_hidden_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(".draft.puml"), DIAGRAM_A).unwrap();
        let server = MockServer::default().respond(DIAGRAM_A, Ok(b"png"));
        let converter = Converter::new(server, ConverterOptions::default()).unwrap();

        let report = converter.convert_dir(temp_dir.path(), |_| {}).unwrap();

        assert_eq!(report.sources, 1);
        assert!(!report.no_sources());
        let expected = temp_dir.path().join("sortie_png").join(".draft.png");
        assert_eq!(report.written, vec![expected.clone()]);
        assert_eq!(fs::read(expected).unwrap(), b"png");
    }

    #[test]
    fn test_convert_dry_run_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("a.puml"), "Bob -> Alice : hello").unwrap();
        let options = ConverterOptions {
            dry_run: true,
            ..ConverterOptions::default()
        };
        let converter = Converter::new(MockServer::default(), options).unwrap();

        let (result, events) = collect_events(&converter, temp_dir.path());
        let report = result.unwrap();

        assert_eq!(
            report.planned,
            vec!["http://mock/png/SyfFKj2rKt3CoKnELR1Io4ZDoSa70000".to_owned()]
        );
        assert_eq!(events, vec!["started a.puml", "planned a.puml"]);
        assert!(converter.server.requests.borrow().is_empty());
        assert!(!temp_dir.path().join("sortie_png").exists());
    }

    #[test]
    fn test_convert_custom_pattern_and_output_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("flow.uml"), DIAGRAM_A).unwrap();
        fs::write(temp_dir.path().join("ignored.puml"), DIAGRAM_B).unwrap();
        let options = ConverterOptions {
            pattern: "*.uml".to_owned(),
            output_dir_name: "images".to_owned(),
            dry_run: false,
        };
        let server = MockServer::default().respond(DIAGRAM_A, Ok(b"png"));
        let converter = Converter::new(server, options).unwrap();

        let report = converter.convert_dir(temp_dir.path(), |_| {}).unwrap();

        assert_eq!(report.sources, 1);
        assert_eq!(
            report.written,
            vec![temp_dir.path().join("images").join("flow.png")]
        );
    }

    #[test]
    fn test_convert_unreadable_source_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("binary.puml"), [0xff, 0xfe, 0x00]).unwrap();
        let converter = Converter::new(MockServer::default(), ConverterOptions::default()).unwrap();

        let err = converter.convert_dir(temp_dir.path(), |_| {}).unwrap_err();

        assert!(matches!(err, RenderError::Read { .. }));
        assert!(err.to_string().contains("binary.puml"));
    }

    #[test]
    fn test_converter_rejects_invalid_pattern() {
        let options = ConverterOptions {
            pattern: "[".to_owned(),
            ..ConverterOptions::default()
        };

        let result = Converter::new(MockServer::default(), options);

        assert!(matches!(result, Err(RenderError::Pattern(_))));
    }
}
