//! Identifying metadata blocks and file format detection.
//!
//! Every results file starts with a fixed-size block of free text (tool
//! name, version, timestamp) that sits outside the entry tree.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::TreeError;
use crate::entry::decode_text;

/// Size of the identifying block in front of a results archive.
pub const ARCHIVE_BLOCK_SIZE: usize = 512;

/// Signature that opens an HDF5 superblock.
pub const HDF5_SIGNATURE: [u8; 8] = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1a, b'\n'];

/// Read up to `size` leading bytes and return the text before the first NUL.
///
/// A source shorter than `size` yields whatever it holds.
pub fn read_user_block<R: Read>(reader: R, size: usize) -> io::Result<String> {
    let mut block = Vec::with_capacity(size);
    reader.take(size as u64).read_to_end(&mut block)?;
    Ok(decode_text(&block))
}

/// On-disk layout of a results file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// HDF5 container whose superblock starts after a user block of this size.
    Hdf5 { user_block: u64 },
    /// JSON results archive behind a fixed identifying block.
    Archive,
}

impl FileFormat {
    /// Size of the identifying block for this format.
    pub fn block_size(self) -> usize {
        match self {
            FileFormat::Hdf5 { user_block } => user_block as usize,
            FileFormat::Archive => ARCHIVE_BLOCK_SIZE,
        }
    }
}

/// Probe for an HDF5 signature at offset 0 and at 512, 1024, 2048, ...
pub fn detect_format<R: Read + Seek>(reader: &mut R) -> io::Result<FileFormat> {
    let len = reader.seek(SeekFrom::End(0))?;
    let mut offset = 0u64;
    let mut signature = [0u8; 8];
    while offset + 8 <= len {
        reader.seek(SeekFrom::Start(offset))?;
        reader.read_exact(&mut signature)?;
        if signature == HDF5_SIGNATURE {
            return Ok(FileFormat::Hdf5 { user_block: offset });
        }
        offset = if offset == 0 { 512 } else { offset * 2 };
    }
    Ok(FileFormat::Archive)
}

/// Detect the format of the file at `path`.
pub fn detect_file_format(path: &Path) -> Result<FileFormat, TreeError> {
    let mut file = BufReader::new(File::open(path)?);
    let format = detect_format(&mut file)?;
    debug!("{}: {:?}", path.display(), format);
    Ok(format)
}

/// Text of the identifying block of the file at `path`.
pub fn identifying_block(path: &Path) -> Result<String, TreeError> {
    let format = detect_file_format(path)?;
    let file = File::open(path)?;
    Ok(read_user_block(file, format.block_size())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_block_truncates_at_nul() {
        let mut bytes = b"MATLAB 7.3 MAT-file, Platform: GLNXA64".to_vec();
        bytes.resize(512, 0);
        bytes.extend_from_slice(b"payload");
        let text = read_user_block(Cursor::new(bytes), 512).unwrap();
        assert_eq!(text, "MATLAB 7.3 MAT-file, Platform: GLNXA64");
    }

    #[test]
    fn test_block_limited_to_size() {
        let text = read_user_block(Cursor::new(b"abcdef".to_vec()), 3).unwrap();
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_short_source_returns_what_is_there() {
        let text = read_user_block(Cursor::new(b"tool 1.0".to_vec()), 512).unwrap();
        assert_eq!(text, "tool 1.0");
    }

    #[test]
    fn test_zero_size_block_is_empty() {
        let text = read_user_block(Cursor::new(b"anything".to_vec()), 0).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_detect_hdf5_after_user_block() {
        let mut bytes = vec![0u8; 512];
        bytes.extend_from_slice(&HDF5_SIGNATURE);
        bytes.extend_from_slice(&[0u8; 64]);
        let format = detect_format(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(format, FileFormat::Hdf5 { user_block: 512 });
        assert_eq!(format.block_size(), 512);
    }

    #[test]
    fn test_detect_hdf5_at_start() {
        let mut bytes = HDF5_SIGNATURE.to_vec();
        bytes.extend_from_slice(&[0u8; 64]);
        let format = detect_format(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(format, FileFormat::Hdf5 { user_block: 0 });
    }

    #[test]
    fn test_detect_archive() {
        let mut bytes = vec![0u8; 512];
        bytes.extend_from_slice(br#"{"kind": "group", "members": {}}"#);
        assert_eq!(
            detect_format(&mut Cursor::new(bytes)).unwrap(),
            FileFormat::Archive
        );
    }
}
