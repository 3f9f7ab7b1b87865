//! nulperr
//!
//! Validate a results file against the latest saved reference results.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nulp_compare::Tone;
use tracing_subscriber::EnvFilter;

mod output;
mod validate;

use output::{ColorChoice, Printer};
use validate::RunError;

/// Validate results file against latest saved reference results
#[derive(Parser, Debug)]
#[command(name = "nulperr")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Results file to validate
    path: PathBuf,

    /// Also print entries that are equal
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Exit with status 2 when any difference is found
    #[arg(long = "strict")]
    strict: bool,

    /// Write a JSON report to this file
    #[arg(long = "json")]
    json: Option<PathBuf>,

    /// Comparison settings (JSON); defaults to <config dir>/nulperr/config.json
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Terminal styling
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// List the reference files found for PATH and exit
    #[arg(long = "list")]
    list: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("NULPERR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();
    let printer = Printer::new(args.color.enabled());

    if args.list {
        return match validate::list(&args, &printer) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => fail(&printer, &err),
        };
    }

    match validate::run(&args, &printer) {
        Ok(report) if args.strict && report.has_differences() => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => fail(&printer, &err),
    }
}

fn fail(printer: &Printer, err: &RunError) -> ExitCode {
    let tone = match err {
        RunError::NoReference(_) => Tone::Emphasis,
        _ => Tone::Plain,
    };
    printer.error_line(tone, &err.to_string());
    ExitCode::from(1)
}
