//! Results archives: a fixed identifying block followed by a JSON tree.
//!
//! ```text
//! [ 512 bytes of NUL-padded text ][ {"kind": "group", "members": {...}} ]
//! ```
//!
//! Datasets carry `dtype`, `shape`, row-major `data` and text `attrs`.
//! Float data may use `null` or `"NaN"` for NaN and `"Infinity"` /
//! `"-Infinity"` for the infinities.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use ndarray::{ArrayD, IxDyn};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::TreeError;
use crate::dtype::ElementType;
use crate::entry::child_path;
use crate::memory::{DatasetBuilder, GroupBuilder, MemGroup};
use crate::userblock::ARCHIVE_BLOCK_SIZE;
use crate::values::ArrayValues;

#[derive(Debug, Deserialize)]
struct RawDataset {
    dtype: ElementType,
    #[serde(default)]
    shape: Vec<usize>,
    data: Vec<Value>,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
}

/// Open the archive at `path` and load its tree.
pub fn open_archive(path: &Path) -> Result<Arc<MemGroup>, TreeError> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(ARCHIVE_BLOCK_SIZE as u64))?;
    let document: Value = serde_json::from_reader(BufReader::new(file))?;
    let root = group_from_json(document, "/")?;
    debug!("loaded archive {}", path.display());
    Ok(root.build())
}

/// Parse an archive body (the JSON after the identifying block).
pub fn parse_archive_body(body: &str) -> Result<Arc<MemGroup>, TreeError> {
    let document: Value = serde_json::from_str(body)?;
    Ok(group_from_json(document, "/")?.build())
}

fn node_kind<'a>(object: &'a Map<String, Value>, path: &str) -> Result<&'a str, TreeError> {
    object
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| TreeError::Malformed(format!("{}: missing \"kind\"", path)))
}

fn group_from_json(value: Value, path: &str) -> Result<GroupBuilder, TreeError> {
    let Value::Object(mut object) = value else {
        return Err(TreeError::Malformed(format!("{}: expected an object", path)));
    };
    if node_kind(&object, path)? != "group" {
        return Err(TreeError::Malformed(format!("{}: expected a group", path)));
    }
    let members = match object.remove("members") {
        Some(Value::Object(members)) => members,
        None => Map::new(),
        Some(_) => {
            return Err(TreeError::Malformed(format!(
                "{}: \"members\" must be an object",
                path
            )));
        }
    };

    let mut group = GroupBuilder::new();
    for (name, member) in members {
        let member_path = child_path(path, &name);
        let Value::Object(ref object) = member else {
            return Err(TreeError::Malformed(format!(
                "{}: expected an object",
                member_path
            )));
        };
        let kind = node_kind(object, &member_path)?.to_string();
        group = match kind.as_str() {
            "group" => group.group(&name, group_from_json(member, &member_path)?),
            "dataset" => group.dataset(&name, dataset_from_json(member, &member_path)?),
            other => return Err(TreeError::UnsupportedEntry(format!("{} ({})", member_path, other))),
        };
    }
    Ok(group)
}

fn dataset_from_json(value: Value, path: &str) -> Result<DatasetBuilder, TreeError> {
    let raw: RawDataset = serde_json::from_value(value)
        .map_err(|e| TreeError::Malformed(format!("{}: {}", path, e)))?;
    let expected: usize = raw.shape.iter().product();
    if raw.data.len() != expected {
        return Err(TreeError::Malformed(format!(
            "{}: shape {:?} needs {} values, found {}",
            path,
            raw.shape,
            expected,
            raw.data.len()
        )));
    }

    let shape = IxDyn(&raw.shape);
    let bad = |what: &Value| {
        TreeError::Malformed(format!("{}: {} is not a valid {}", path, what, raw.dtype))
    };
    let values = match raw.dtype {
        ElementType::Bool => {
            let data = raw
                .data
                .iter()
                .map(|v| v.as_bool().ok_or_else(|| bad(v)))
                .collect::<Result<Vec<_>, _>>()?;
            ArrayValues::Bool(from_shape(shape, data, path)?)
        }
        t if t.is_signed_int() => {
            let (min, max) = signed_range(t.bits());
            let data = raw
                .data
                .iter()
                .map(|v| {
                    v.as_i64()
                        .filter(|i| (min..=max).contains(i))
                        .ok_or_else(|| bad(v))
                })
                .collect::<Result<Vec<_>, _>>()?;
            ArrayValues::Int(from_shape(shape, data, path)?)
        }
        t if t.is_unsigned_int() => {
            let max = unsigned_max(t.bits());
            let data = raw
                .data
                .iter()
                .map(|v| v.as_u64().filter(|u| *u <= max).ok_or_else(|| bad(v)))
                .collect::<Result<Vec<_>, _>>()?;
            ArrayValues::UInt(from_shape(shape, data, path)?)
        }
        ElementType::Float32 => {
            let data = raw
                .data
                .iter()
                .map(|v| json_float(v).map(|f| f as f32).ok_or_else(|| bad(v)))
                .collect::<Result<Vec<_>, _>>()?;
            ArrayValues::Float32(from_shape(shape, data, path)?)
        }
        _ => {
            let data = raw
                .data
                .iter()
                .map(|v| json_float(v).ok_or_else(|| bad(v)))
                .collect::<Result<Vec<_>, _>>()?;
            ArrayValues::Float64(from_shape(shape, data, path)?)
        }
    };

    let mut dataset = DatasetBuilder::new(raw.dtype, values)?;
    for (name, text) in &raw.attrs {
        dataset = dataset.attr(name, text);
    }
    Ok(dataset)
}

fn from_shape<T>(shape: IxDyn, data: Vec<T>, path: &str) -> Result<ArrayD<T>, TreeError> {
    ArrayD::from_shape_vec(shape, data).map_err(|e| TreeError::Malformed(format!("{}: {}", path, e)))
}

fn json_float(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(f64::NAN),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.as_str() {
            "NaN" | "nan" => Some(f64::NAN),
            "Infinity" | "inf" => Some(f64::INFINITY),
            "-Infinity" | "-inf" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

fn signed_range(bits: u32) -> (i64, i64) {
    let max = (1i128 << (bits - 1)) - 1;
    (-(max as i64) - 1, max as i64)
}

fn unsigned_max(bits: u32) -> u64 {
    ((1u128 << bits) - 1) as u64
}
