//! ULP regression comparison of hierarchical results files.
//!
//! Resolves the latest versioned reference for a results file, walks the
//! reference tree against the candidate and measures floating-point
//! differences in units in the last place.

use std::path::PathBuf;

use nulp_tree::TreeError;
use thiserror::Error;

pub mod diff;
pub mod leaf;
pub mod options;
pub mod outcome;
pub mod report;
pub mod resolve;
pub mod ulp;
pub mod version;

pub use diff::{compare_trees, extra_top_level_keys};
pub use leaf::compare_datasets;
pub use options::CompareOptions;
pub use outcome::{LeafEvent, Outcome, Severity, StructuralReason, UlpSummary};
pub use report::{FileSummary, Tone, ValidationReport};
pub use resolve::{ReferenceFile, ResolveError, find_latest_reference, list_references};
pub use version::{Version, VersionError};

/// Errors that abort a whole comparison.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error(transparent)]
    Tree(TreeError),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("cannot read options from {}: {message}", path.display())]
    Options { path: PathBuf, message: String },
}

impl From<TreeError> for CompareError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::UnsupportedEntry(path) => {
                CompareError::InvariantViolation(format!("entry {} is neither a group nor a dataset", path))
            }
            other => CompareError::Tree(other),
        }
    }
}
