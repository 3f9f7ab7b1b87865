//! HDF5 backend, enabled with the `hdf5` feature.
//!
//! MATLAB v7.3 `.mat` files are HDF5 files with a 512-byte user block, so
//! this backend reads them directly. Members come back in name order.

use std::path::Path;

use hdf5::types::{FixedAscii, FloatSize, IntSize, TypeDescriptor, VarLenUnicode};
use tracing::debug;

use crate::TreeError;
use crate::dtype::ElementType;
use crate::entry::{DatasetNode, Entry, GroupNode, child_path, decode_text};
use crate::values::ArrayValues;

impl From<hdf5::Error> for TreeError {
    fn from(e: hdf5::Error) -> Self {
        TreeError::Hdf5(e.to_string())
    }
}

pub struct H5Group {
    path: String,
    // Held so the file stays open as long as any node does.
    _file: hdf5::File,
    group: hdf5::Group,
}

pub struct H5Dataset {
    path: String,
    _file: hdf5::File,
    dataset: hdf5::Dataset,
}

/// Open the file at `path` and return its root group.
pub fn open_hdf5(path: &Path) -> Result<H5Group, TreeError> {
    let file = hdf5::File::open(path)?;
    let group = file.as_group()?;
    debug!("opened HDF5 file {}", path.display());
    Ok(H5Group {
        path: "/".to_string(),
        _file: file,
        group,
    })
}

impl GroupNode for H5Group {
    fn path(&self) -> &str {
        &self.path
    }

    fn member_names(&self) -> Result<Vec<String>, TreeError> {
        Ok(self.group.member_names()?)
    }

    fn member(&self, name: &str) -> Result<Option<Entry>, TreeError> {
        if !self.group.link_exists(name) {
            return Ok(None);
        }
        let path = child_path(&self.path, name);
        if let Ok(group) = self.group.group(name) {
            return Ok(Some(Entry::Group(Box::new(H5Group {
                path,
                _file: self._file.clone(),
                group,
            }))));
        }
        if let Ok(dataset) = self.group.dataset(name) {
            return Ok(Some(Entry::Dataset(Box::new(H5Dataset {
                path,
                _file: self._file.clone(),
                dataset,
            }))));
        }
        Err(TreeError::UnsupportedEntry(path))
    }
}

impl DatasetNode for H5Dataset {
    fn path(&self) -> &str {
        &self.path
    }

    fn shape(&self) -> Vec<usize> {
        self.dataset.shape()
    }

    fn dtype(&self) -> Result<ElementType, TreeError> {
        let descriptor = self.dataset.dtype()?.to_descriptor()?;
        let ty = match descriptor {
            TypeDescriptor::Boolean => ElementType::Bool,
            TypeDescriptor::Integer(IntSize::U1) => ElementType::Int8,
            TypeDescriptor::Integer(IntSize::U2) => ElementType::Int16,
            TypeDescriptor::Integer(IntSize::U4) => ElementType::Int32,
            TypeDescriptor::Integer(IntSize::U8) => ElementType::Int64,
            TypeDescriptor::Unsigned(IntSize::U1) => ElementType::UInt8,
            TypeDescriptor::Unsigned(IntSize::U2) => ElementType::UInt16,
            TypeDescriptor::Unsigned(IntSize::U4) => ElementType::UInt32,
            TypeDescriptor::Unsigned(IntSize::U8) => ElementType::UInt64,
            TypeDescriptor::Float(FloatSize::U4) => ElementType::Float32,
            TypeDescriptor::Float(FloatSize::U8) => ElementType::Float64,
            other => {
                return Err(TreeError::Hdf5(format!(
                    "{}: unsupported element type {:?}",
                    self.path, other
                )));
            }
        };
        Ok(ty)
    }

    fn read(&self) -> Result<ArrayValues, TreeError> {
        let ty = self.dtype()?;
        let values = match ty {
            ElementType::Bool => ArrayValues::Bool(self.dataset.read_dyn::<bool>()?),
            t if t.is_signed_int() => ArrayValues::Int(self.dataset.read_dyn::<i64>()?),
            t if t.is_unsigned_int() => ArrayValues::UInt(self.dataset.read_dyn::<u64>()?),
            ElementType::Float32 => ArrayValues::Float32(self.dataset.read_dyn::<f32>()?),
            _ => ArrayValues::Float64(self.dataset.read_dyn::<f64>()?),
        };
        Ok(values)
    }

    fn text_attr(&self, name: &str) -> Result<Option<String>, TreeError> {
        if !self.dataset.attr_names()?.iter().any(|n| n == name) {
            return Ok(None);
        }
        let attr = self.dataset.attr(name)?;
        // MATLAB writes fixed-length strings; other tools use variable length.
        if let Ok(text) = attr.read_scalar::<FixedAscii<256>>() {
            return Ok(Some(decode_text(text.as_bytes())));
        }
        if let Ok(text) = attr.read_scalar::<VarLenUnicode>() {
            return Ok(Some(decode_text(text.as_bytes())));
        }
        Err(TreeError::Hdf5(format!(
            "{}: attribute {} is not text",
            self.path, name
        )))
    }
}
