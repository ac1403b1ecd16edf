//! Byte layout of an encoded block
//!
//! ```text
//! offset 0                 header        count: u64, fetched_at: f64
//! offset 16                metadata[0]   4120 bytes
//! ...                      metadata[count - 1]
//! offset 16 + count*4120   content       NUL-terminated bodies (files only)
//! ```
//!
//! A metadata entry is laid out as:
//!
//! ```text
//! 0     path            [u8; 4096], NUL-terminated
//! 4096  content_size    u64
//! 4104  content_offset  u64
//! 4112  is_directory    i32
//! 4116  is_file         i32
//! ```
//!
//! All integers are little-endian.

use crate::classifier::EntryKind;
use crate::error::BlockError;

pub const HEADER_SIZE: usize = 16;
pub const PATH_FIELD_SIZE: usize = 4096;
/// Longest name that still leaves room for the terminating NUL
pub const MAX_NAME_LEN: usize = PATH_FIELD_SIZE - 1;
pub const METADATA_ENTRY_SIZE: usize = PATH_FIELD_SIZE + 8 + 8 + 4 + 4;

/// Offset of the first content buffer for a block of `count` entries
pub fn content_base(count: usize) -> usize {
    HEADER_SIZE + count * METADATA_ENTRY_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockHeader {
    pub count: u64,
    /// Seconds since the Unix epoch
    pub fetched_at: f64,
}

impl BlockHeader {
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.count.to_le_bytes());
        buf.extend_from_slice(&self.fetched_at.to_le_bytes());
    }

    pub fn read(bytes: &[u8]) -> Result<Self, BlockError> {
        if bytes.len() < HEADER_SIZE {
            return Err(BlockError::Truncated {
                needed: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            count: u64::from_le_bytes(le_array(&bytes[0..8])),
            fetched_at: f64::from_le_bytes(le_array(&bytes[8..16])),
        })
    }
}

/// One decoded metadata entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub name: String,
    pub content_size: u64,
    pub content_offset: u64,
    pub kind: EntryKind,
}

impl MetadataEntry {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Parse the entry at `index` from exactly one entry's worth of bytes
    pub fn read(bytes: &[u8], index: usize) -> Result<Self, BlockError> {
        if bytes.len() < METADATA_ENTRY_SIZE {
            return Err(BlockError::Truncated {
                needed: METADATA_ENTRY_SIZE,
                actual: bytes.len(),
            });
        }

        let path = &bytes[..PATH_FIELD_SIZE];
        let name_len = path
            .iter()
            .position(|b| *b == 0)
            .ok_or(BlockError::UnterminatedPath { index })?;

        let content_size = u64::from_le_bytes(le_array(&bytes[4096..4104]));
        let content_offset = u64::from_le_bytes(le_array(&bytes[4104..4112]));
        let is_directory = i32::from_le_bytes(le_array(&bytes[4112..4116]));
        let is_file = i32::from_le_bytes(le_array(&bytes[4116..4120]));

        let kind = match (is_directory, is_file) {
            (1, 0) => EntryKind::Directory,
            (0, 1) => EntryKind::File,
            _ => {
                return Err(BlockError::InconsistentFlags {
                    index,
                    is_directory,
                    is_file,
                })
            }
        };

        Ok(Self {
            name: decode_latin1(&path[..name_len]),
            content_size,
            content_offset,
            kind,
        })
    }
}

/// Append one metadata entry; `path` must already fit in `MAX_NAME_LEN`
pub(crate) fn write_entry(
    buf: &mut Vec<u8>,
    path: &[u8],
    content_size: u64,
    content_offset: u64,
    kind: EntryKind,
) {
    debug_assert!(path.len() <= MAX_NAME_LEN);

    let start = buf.len();
    buf.extend_from_slice(path);
    buf.resize(start + PATH_FIELD_SIZE, 0);
    buf.extend_from_slice(&content_size.to_le_bytes());
    buf.extend_from_slice(&content_offset.to_le_bytes());

    let (is_directory, is_file): (i32, i32) = match kind {
        EntryKind::Directory => (1, 0),
        EntryKind::File => (0, 1),
    };
    buf.extend_from_slice(&is_directory.to_le_bytes());
    buf.extend_from_slice(&is_file.to_le_bytes());
}

/// Map single-byte ISO-8859-1 text back to a string
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|b| char::from(*b)).collect()
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
