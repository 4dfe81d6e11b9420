//! emberc: The Ember binder CLI.
//!
//! Usage:
//!   emberc [options] <unit.json>
//!
//! Reads a JSON-serialized syntax tree, binds it and reports diagnostics.
//! Exits with 1 when the program has errors, 2 when it could not be loaded.

use clap::Parser as ClapParser;
use ember_cli::{config, Options};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "emberc", about = "emberc - Ember semantic binder", version)]
struct Cli {
    /// Serialized compilation unit.
    #[arg(value_name = "UNIT")]
    unit: PathBuf,

    /// Source text the unit was parsed from, for diagnostic snippets.
    #[arg(long)]
    source: Option<PathBuf>,

    /// Package manifest to register. May be repeated.
    #[arg(long = "package", value_name = "FILE")]
    packages: Vec<PathBuf>,

    /// Path to ember.json.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Print the bound tree.
    #[arg(long = "emit-bound")]
    emit_bound: bool,

    /// Lower control flow after binding.
    #[arg(long)]
    lower: bool,

    /// Print diagnostics as JSON.
    #[arg(long)]
    json: bool,

    /// Stop printing diagnostics after N.
    #[arg(long = "max-errors", value_name = "N")]
    max_errors: Option<usize>,

    /// Log more. Repeat for more detail; RUST_LOG overrides.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return fail(e.into()),
    };

    let options = Options {
        unit: cli.unit,
        source: cli.source,
        packages: cli.packages,
        emit_bound_tree: cli.emit_bound,
        lower: cli.lower,
        json: cli.json,
        max_errors: cli.max_errors,
    }
    .merge(config);

    match ember_cli::run(&options) {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(1),
        Err(e) => fail(e),
    }
}

fn fail(error: ember_cli::CliError) -> ExitCode {
    eprintln!("{:?}", miette::Report::new(error));
    ExitCode::from(2)
}
