//! In-memory entry tree.
//!
//! Used by the archive reader once a document is parsed, and by tests that
//! need a tree without touching the filesystem.

use std::collections::BTreeMap;
use std::sync::Arc;

use ndarray::{ArrayD, IxDyn};

use crate::TreeError;
use crate::dtype::ElementType;
use crate::entry::{DatasetNode, Entry, GroupNode, child_path};
use crate::values::ArrayValues;

#[derive(Debug, Clone)]
pub enum MemNode {
    Group(Arc<MemGroup>),
    Dataset(Arc<MemDataset>),
}

impl MemNode {
    fn to_entry(&self) -> Entry {
        match self {
            MemNode::Group(g) => Entry::Group(Box::new(Arc::clone(g))),
            MemNode::Dataset(d) => Entry::Dataset(Box::new(Arc::clone(d))),
        }
    }
}

#[derive(Debug)]
pub struct MemGroup {
    path: String,
    members: Vec<(String, MemNode)>,
}

#[derive(Debug)]
pub struct MemDataset {
    path: String,
    dtype: ElementType,
    values: ArrayValues,
    attrs: BTreeMap<String, String>,
}

impl GroupNode for MemGroup {
    fn path(&self) -> &str {
        &self.path
    }

    fn member_names(&self) -> Result<Vec<String>, TreeError> {
        Ok(self.members.iter().map(|(name, _)| name.clone()).collect())
    }

    fn member(&self, name: &str) -> Result<Option<Entry>, TreeError> {
        Ok(self
            .members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node.to_entry()))
    }
}

impl DatasetNode for MemDataset {
    fn path(&self) -> &str {
        &self.path
    }

    fn shape(&self) -> Vec<usize> {
        self.values.shape().to_vec()
    }

    fn dtype(&self) -> Result<ElementType, TreeError> {
        Ok(self.dtype)
    }

    fn read(&self) -> Result<ArrayValues, TreeError> {
        Ok(self.values.clone())
    }

    fn text_attr(&self, name: &str) -> Result<Option<String>, TreeError> {
        Ok(self.attrs.get(name).cloned())
    }
}

impl<T: GroupNode + ?Sized> GroupNode for Arc<T> {
    fn path(&self) -> &str {
        (**self).path()
    }

    fn member_names(&self) -> Result<Vec<String>, TreeError> {
        (**self).member_names()
    }

    fn member(&self, name: &str) -> Result<Option<Entry>, TreeError> {
        (**self).member(name)
    }
}

impl<T: DatasetNode + ?Sized> DatasetNode for Arc<T> {
    fn path(&self) -> &str {
        (**self).path()
    }

    fn shape(&self) -> Vec<usize> {
        (**self).shape()
    }

    fn dtype(&self) -> Result<ElementType, TreeError> {
        (**self).dtype()
    }

    fn read(&self) -> Result<ArrayValues, TreeError> {
        (**self).read()
    }

    fn text_attr(&self, name: &str) -> Result<Option<String>, TreeError> {
        (**self).text_attr(name)
    }
}

/// Builder for an in-memory group; paths are assigned by [`GroupBuilder::build`].
#[derive(Debug, Default)]
pub struct GroupBuilder {
    members: Vec<(String, Member)>,
}

#[derive(Debug)]
enum Member {
    Group(GroupBuilder),
    Dataset(DatasetBuilder),
}

impl GroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(self, name: &str, group: GroupBuilder) -> Self {
        self.insert(name, Member::Group(group))
    }

    pub fn dataset(self, name: &str, dataset: DatasetBuilder) -> Self {
        self.insert(name, Member::Dataset(dataset))
    }

    // A repeated name replaces the earlier member in place.
    fn insert(mut self, name: &str, member: Member) -> Self {
        match self.members.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = member,
            None => self.members.push((name.to_string(), member)),
        }
        self
    }

    /// Build the tree rooted at `/`.
    pub fn build(self) -> Arc<MemGroup> {
        self.build_at("/".to_string())
    }

    fn build_at(self, path: String) -> Arc<MemGroup> {
        let members = self
            .members
            .into_iter()
            .map(|(name, member)| {
                let member_path = child_path(&path, &name);
                let node = match member {
                    Member::Group(g) => MemNode::Group(g.build_at(member_path)),
                    Member::Dataset(d) => MemNode::Dataset(Arc::new(MemDataset {
                        path: member_path,
                        dtype: d.dtype,
                        values: d.values,
                        attrs: d.attrs,
                    })),
                };
                (name, node)
            })
            .collect();
        Arc::new(MemGroup { path, members })
    }
}

/// Builder for an in-memory dataset.
#[derive(Debug)]
pub struct DatasetBuilder {
    dtype: ElementType,
    values: ArrayValues,
    attrs: BTreeMap<String, String>,
}

impl DatasetBuilder {
    /// Pair values with their element type; the storage class must agree.
    pub fn new(dtype: ElementType, values: ArrayValues) -> Result<Self, TreeError> {
        let storage_ok = match &values {
            ArrayValues::Bool(_) => dtype == ElementType::Bool,
            ArrayValues::Int(_) => dtype.is_signed_int(),
            ArrayValues::UInt(_) => dtype.is_unsigned_int(),
            ArrayValues::Float32(_) => dtype == ElementType::Float32,
            ArrayValues::Float64(_) => dtype == ElementType::Float64,
        };
        if !storage_ok {
            return Err(TreeError::Malformed(format!(
                "{} values stored for element type {}",
                storage_name(&values),
                dtype
            )));
        }
        Ok(Self {
            dtype,
            values,
            attrs: BTreeMap::new(),
        })
    }

    pub fn float64(shape: &[usize], data: Vec<f64>) -> Result<Self, TreeError> {
        let array = ArrayD::from_shape_vec(IxDyn(shape), data)
            .map_err(|e| TreeError::Malformed(e.to_string()))?;
        Self::new(ElementType::Float64, ArrayValues::Float64(array))
    }

    pub fn float32(shape: &[usize], data: Vec<f32>) -> Result<Self, TreeError> {
        let array = ArrayD::from_shape_vec(IxDyn(shape), data)
            .map_err(|e| TreeError::Malformed(e.to_string()))?;
        Self::new(ElementType::Float32, ArrayValues::Float32(array))
    }

    pub fn int(dtype: ElementType, shape: &[usize], data: Vec<i64>) -> Result<Self, TreeError> {
        let array = ArrayD::from_shape_vec(IxDyn(shape), data)
            .map_err(|e| TreeError::Malformed(e.to_string()))?;
        Self::new(dtype, ArrayValues::Int(array))
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }
}

fn storage_name(values: &ArrayValues) -> &'static str {
    match values {
        ArrayValues::Bool(_) => "bool",
        ArrayValues::Int(_) => "signed integer",
        ArrayValues::UInt(_) => "unsigned integer",
        ArrayValues::Float32(_) => "float32",
        ArrayValues::Float64(_) => "float64",
    }
}
