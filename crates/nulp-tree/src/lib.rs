//! nulp-tree: read-only hierarchical results files
//!
//! Opens results files, exposes their entry tree and reads the identifying
//! text block stored in front of it.

use std::path::Path;

use thiserror::Error;
use tracing::info;

pub mod archive;
pub mod dtype;
pub mod entry;
#[cfg(feature = "hdf5")]
pub mod h5;
pub mod memory;
pub mod userblock;
pub mod values;

pub use dtype::ElementType;
pub use entry::{DatasetNode, Entry, EntryKind, GroupNode};
pub use userblock::{FileFormat, identifying_block, read_user_block};
pub use values::ArrayValues;

/// Results file errors
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed results file: {0}")]
    Malformed(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported entry kind at {0}")]
    UnsupportedEntry(String),

    #[error("HDF5 error: {0}")]
    Hdf5(String),
}

/// An open results file.
///
/// The file's handles are released when this value is dropped.
pub struct ResultsFile {
    root: Box<dyn GroupNode>,
}

impl ResultsFile {
    /// Open the file at `path`, detecting its format.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let format = userblock::detect_file_format(path)?;
        let root: Box<dyn GroupNode> = match format {
            FileFormat::Archive => Box::new(archive::open_archive(path)?),
            FileFormat::Hdf5 { .. } => open_hdf5_root(path)?,
        };
        info!("opened {} ({:?})", path.display(), format);
        Ok(Self { root })
    }

    /// The root group, path `/`.
    pub fn root(&self) -> &dyn GroupNode {
        self.root.as_ref()
    }
}

#[cfg(feature = "hdf5")]
fn open_hdf5_root(path: &Path) -> Result<Box<dyn GroupNode>, TreeError> {
    Ok(Box::new(h5::open_hdf5(path)?))
}

#[cfg(not(feature = "hdf5"))]
fn open_hdf5_root(path: &Path) -> Result<Box<dyn GroupNode>, TreeError> {
    Err(TreeError::UnsupportedFormat(format!(
        "{} is an HDF5 file; rebuild with `--features hdf5` to read it",
        path.display()
    )))
}
