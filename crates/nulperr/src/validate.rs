//! The validation run: resolve, print provenance, walk, summarize.

use std::path::{Path, PathBuf};

use nulp_compare::{
    CompareError, CompareOptions, FileSummary, LeafEvent, ResolveError, Tone, ValidationReport,
    compare_trees, extra_top_level_keys, find_latest_reference, list_references,
};
use nulp_tree::{ResultsFile, TreeError, identifying_block};
use thiserror::Error;
use tracing::{debug, info};

use crate::Args;
use crate::output::Printer;

/// Anything that ends a run with status 1.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{} does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("Reference file for {} not found", .0.display())]
    NoReference(PathBuf),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Compare(#[from] CompareError),

    #[error("cannot write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

fn compare_options(config: Option<&Path>) -> Result<CompareOptions, CompareError> {
    match config {
        Some(path) => CompareOptions::load(path),
        None => match CompareOptions::default_path() {
            Some(path) => CompareOptions::load_or_default(&path),
            None => Ok(CompareOptions::default()),
        },
    }
}

/// Print every reference for the candidate, oldest first.
pub fn list(args: &Args, printer: &Printer) -> Result<(), RunError> {
    ensure_exists(&args.path)?;
    let references = list_references(&args.path)?;
    if references.is_empty() {
        printer.line(
            Tone::Emphasis,
            &format!("No reference files for {}", args.path.display()),
        );
    }
    for reference in references {
        println!("{:12} {}", reference.version.to_string(), reference.path.display());
    }
    Ok(())
}

/// Compare the candidate against its latest reference.
pub fn run(args: &Args, printer: &Printer) -> Result<ValidationReport, RunError> {
    ensure_exists(&args.path)?;
    let options = compare_options(args.config.as_deref())?;
    debug!("compare options: {:?}", options);

    let reference = find_latest_reference(&args.path)?
        .ok_or_else(|| RunError::NoReference(args.path.clone()))?;
    info!("latest reference {} ({})", reference.path.display(), reference.version);

    let candidate_block = print_block(printer, "Validate", &args.path)?;
    let reference_block = print_block(printer, "Reference", &reference.path)?;

    let reference_file = ResultsFile::open(&reference.path)?;
    let candidate_file = ResultsFile::open(&args.path)?;

    let mut report = ValidationReport::new(
        FileSummary {
            path: args.path.clone(),
            identifying_block: candidate_block,
            version: None,
        },
        FileSummary {
            path: reference.path.clone(),
            identifying_block: reference_block,
            version: Some(reference.version.clone()),
        },
    );

    compare_trees(
        candidate_file.root(),
        reference_file.root(),
        &options,
        &mut |event: LeafEvent| {
            if event.is_shown(args.verbose) {
                printer.line(event.tone(), &event.line());
            }
            report.add_event(event);
        },
    )?;

    report.set_extra_keys(extra_top_level_keys(
        candidate_file.root(),
        reference_file.root(),
    )?);
    if let Some(line) = report.extra_keys_line() {
        printer.line(Tone::Emphasis, &line);
    }
    if args.verbose {
        printer.line(Tone::Dim, &report.summary_line());
    }
    info!("{}", report.summary_line());

    if let Some(path) = &args.json {
        std::fs::write(path, report.to_json()?).map_err(|source| RunError::Report {
            path: path.clone(),
            source,
        })?;
        info!("wrote report to {}", path.display());
    }

    Ok(report)
}

fn ensure_exists(path: &Path) -> Result<(), RunError> {
    if path.exists() {
        Ok(())
    } else {
        Err(RunError::PathNotFound(path.to_path_buf()))
    }
}

fn print_block(printer: &Printer, label: &str, path: &Path) -> Result<String, TreeError> {
    printer.line(Tone::Info, &format!("{}: {}", label, path.display()));
    let block = identifying_block(path)?;
    println!("  {}", block);
    Ok(block)
}
