//! Locating the latest reference file next to a results file.
//!
//! A results file `name.ext` pairs with references named
//! `name-<version>-ref.ext` in the same directory.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::version::{Version, VersionError};

/// Suffix that marks a reference file stem.
pub const REF_SUFFIX: &str = "-ref";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot list {dir}: {source}")]
    Io {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    InvalidVersion {
        path: PathBuf,
        #[source]
        source: VersionError,
    },

    #[error("{0} has no file name")]
    NoFileName(PathBuf),
}

/// A reference file and the version parsed from its name.
#[derive(Debug, Clone)]
pub struct ReferenceFile {
    pub path: PathBuf,
    pub version: Version,
}

/// Version text of `name` if it is a reference name for `stem` and `extension`.
///
/// `name` must look like `<stem>-<version>-ref` followed by `.<extension>`
/// when the candidate has one. The version text is returned unparsed.
pub fn reference_version_text<'a>(
    name: &'a str,
    stem: &str,
    extension: Option<&str>,
) -> Option<&'a str> {
    let name_stem = match extension {
        Some(ext) => name.strip_suffix(ext)?.strip_suffix('.')?,
        None => name,
    };
    let middle = name_stem
        .strip_prefix(stem)?
        .strip_prefix('-')?
        .strip_suffix(REF_SUFFIX)?;
    if middle.is_empty() { None } else { Some(middle) }
}

/// Every reference for `candidate`, oldest first.
///
/// Equal versions are ordered by file name. A matching name whose version
/// does not parse is an error: a malformed reference could be the latest.
pub fn list_references(candidate: &Path) -> Result<Vec<ReferenceFile>, ResolveError> {
    let file_name = candidate
        .file_name()
        .ok_or_else(|| ResolveError::NoFileName(candidate.to_path_buf()))?;
    let as_candidate = Path::new(file_name);
    let stem = as_candidate
        .file_stem()
        .and_then(OsStr::to_str)
        .ok_or_else(|| ResolveError::NoFileName(candidate.to_path_buf()))?;
    let extension = as_candidate.extension().and_then(OsStr::to_str);

    let dir = match candidate.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let entries = std::fs::read_dir(&dir).map_err(|source| ResolveError::Io {
        dir: dir.clone(),
        source,
    })?;

    let mut references = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ResolveError::Io {
            dir: dir.clone(),
            source,
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(text) = reference_version_text(name, stem, extension) else {
            continue;
        };
        let path = dir.join(name);
        let version = Version::parse(text).map_err(|source| ResolveError::InvalidVersion {
            path: path.clone(),
            source,
        })?;
        debug!("reference candidate {} (version {})", path.display(), version);
        references.push(ReferenceFile { path, version });
    }

    references.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.path.cmp(&b.path)));
    Ok(references)
}

/// The reference with the highest version, or `None` when there is none.
pub fn find_latest_reference(candidate: &Path) -> Result<Option<ReferenceFile>, ResolveError> {
    Ok(list_references(candidate)?.pop())
}
