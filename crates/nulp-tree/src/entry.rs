//! The entry tree of a results file.
//!
//! A results file holds exactly two kinds of entries, so [`Entry`] is a
//! closed enum. Storage backends provide the node behind each variant and
//! load children and values only when asked.

use crate::TreeError;
use crate::dtype::ElementType;
use crate::values::ArrayValues;

/// A named container of sub-entries.
pub trait GroupNode {
    /// Absolute path, `/` for the root.
    fn path(&self) -> &str;

    /// Member names in the group's own iteration order.
    fn member_names(&self) -> Result<Vec<String>, TreeError>;

    /// Look up a direct member. `Ok(None)` when no such member exists.
    fn member(&self, name: &str) -> Result<Option<Entry>, TreeError>;
}

/// A typed array plus its attributes.
pub trait DatasetNode {
    fn path(&self) -> &str;

    fn shape(&self) -> Vec<usize>;

    /// Element type; backends fail here for types they cannot represent.
    fn dtype(&self) -> Result<ElementType, TreeError>;

    /// Read every element.
    fn read(&self) -> Result<ArrayValues, TreeError>;

    /// A text attribute, truncated at the first NUL.
    fn text_attr(&self, name: &str) -> Result<Option<String>, TreeError>;
}

/// One entry of the tree.
pub enum Entry {
    Group(Box<dyn GroupNode>),
    Dataset(Box<dyn DatasetNode>),
}

impl Entry {
    pub fn path(&self) -> &str {
        match self {
            Entry::Group(g) => g.path(),
            Entry::Dataset(d) => d.path(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Group(_) => EntryKind::Group,
            Entry::Dataset(_) => EntryKind::Dataset,
        }
    }
}

impl core::fmt::Debug for Entry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({})", self.kind(), self.path())
    }
}

/// Discriminant of [`Entry`], for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    Group,
    Dataset,
}

/// Join a parent path and a member name.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Truncate raw attribute or block bytes at the first NUL and decode them.
pub fn decode_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("/", "a"), "/a");
        assert_eq!(child_path("/a", "b"), "/a/b");
    }

    #[test]
    fn test_decode_text_stops_at_nul() {
        assert_eq!(decode_text(b"double\0\0junk"), "double");
        assert_eq!(decode_text(b"single"), "single");
        assert_eq!(decode_text(b""), "");
    }
}
