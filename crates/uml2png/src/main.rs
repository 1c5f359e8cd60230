//! uml2png CLI - render local `PlantUML` files to PNG.
//!
//! Scans a directory (default: current directory) for `*.puml` files, sends
//! each one to a `PlantUML` server and writes the returned images into the
//! `sortie_png` subdirectory.

mod convert;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use convert::ConvertArgs;
use output::Output;

/// uml2png - render `PlantUML` diagrams to PNG via a `PlantUML` server.
#[derive(Parser)]
#[command(name = "uml2png", version, about)]
struct Cli {
    #[command(flatten)]
    args: ConvertArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.args.execute(&output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
