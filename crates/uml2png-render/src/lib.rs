//! `PlantUML` server rendering for uml2png.
//!
//! This crate turns a directory of diagram sources into PNG files:
//! - [`discover_sources`] lists matching files in a single directory
//! - [`DiagramServer`] abstracts the rendering service; [`PlantUmlServer`]
//!   talks to a real `PlantUML` server over HTTP
//! - [`Converter`] runs the sequential batch and reports per-file outcomes
//!
//! Per-file fetch failures never abort a batch. Filesystem failures do.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use uml2png_render::{Converter, ConverterOptions, PlantUmlServer};
//!
//! let server = PlantUmlServer::new("https://www.plantuml.com/plantuml", Duration::from_secs(30));
//! let converter = Converter::new(server, ConverterOptions::default()).unwrap();
//! let report = converter.convert_dir(Path::new("."), |_| {}).unwrap();
//! println!("{} written, {} failed", report.written.len(), report.failures.len());
//! ```

mod converter;
mod error;
mod server;
mod source;

pub use converter::{BatchReport, ConvertEvent, Converter, ConverterOptions, FileFailure};
pub use error::RenderError;
pub use server::{DiagramServer, FetchError, PlantUmlServer};
pub use source::{SourceFile, discover_sources};
