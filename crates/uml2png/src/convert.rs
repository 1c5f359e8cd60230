//! Directory conversion command.

use std::path::PathBuf;

use clap::Args;
use uml2png_config::{CliSettings, Config};
use uml2png_render::{
    BatchReport, ConvertEvent, Converter, ConverterOptions, FetchError, PlantUmlServer,
};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for converting a directory of diagrams.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Directory containing diagram sources (default: current directory).
    pub(crate) input_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover uml2png.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// `PlantUML` server URL (overrides config).
    #[arg(long, env = "UML2PNG_SERVER_URL")]
    pub(crate) server_url: Option<String>,

    /// HTTP timeout in seconds (overrides config).
    #[arg(long)]
    pub(crate) timeout: Option<u64>,

    /// File name glob for diagram sources (overrides config).
    #[arg(long)]
    pub(crate) pattern: Option<String>,

    /// Name of the output subdirectory (overrides config).
    #[arg(long)]
    pub(crate) output_dir_name: Option<String>,

    /// Print the request URL for each file without contacting the server.
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Enable verbose output (request and timing logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    /// Execute the conversion.
    ///
    /// Per-file server failures are printed and do not fail the command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, the input directory cannot
    /// be read, or a source or image file cannot be read or written.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            server_url: self.server_url,
            timeout_secs: self.timeout,
            pattern: self.pattern,
            output_dir_name: self.output_dir_name,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let input_dir = match self.input_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };

        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let server = PlantUmlServer::new(&config.server.url, config.server.timeout());
        let options = ConverterOptions {
            pattern: config.input.pattern.clone(),
            output_dir_name: config.output.dir_name.clone(),
            dry_run: self.dry_run,
        };
        let converter = Converter::new(server, options)?;

        let report = converter.convert_dir(&input_dir, |event| print_event(output, &event))?;

        if report.no_sources() {
            output.no_sources(&config.input.pattern, &input_dir);
            return Ok(());
        }

        output.summary(
            &summary_line(&report, self.dry_run),
            report.failures.is_empty(),
        );
        Ok(())
    }
}

/// Print progress for a single event.
fn print_event(output: &Output, event: &ConvertEvent<'_>) {
    match event {
        ConvertEvent::Started { source } => output.processing(&source.file_name),
        ConvertEvent::Written { output: path, .. } => output.created(path),
        ConvertEvent::Planned { url, .. } => output.planned(url),
        ConvertEvent::Failed { source, error } => {
            output.skipped(&failure_message(&source.file_name, error));
        }
    }
}

/// User-facing message for a skipped file.
fn failure_message(file_name: &str, error: &FetchError) -> String {
    match error {
        FetchError::Status { status } => format!("Error with {file_name}: HTTP status {status}"),
        FetchError::Connection(message) => format!("Connection error for {file_name}: {message}"),
        FetchError::Body(_) => format!("Error with {file_name}: {error}"),
    }
}

/// One-line summary of a finished batch.
fn summary_line(report: &BatchReport, dry_run: bool) -> String {
    if dry_run {
        return format!("Planned {} of {} diagrams", report.planned.len(), report.sources);
    }
    let mut line = format!(
        "Converted {} of {} diagrams into {}",
        report.written.len(),
        report.sources,
        report.output_dir.display()
    );
    if !report.failures.is_empty() {
        line.push_str(&format!(" ({} failed)", report.failures.len()));
    }
    line
}
