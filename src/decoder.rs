//! Reading encoded blocks back
//!
//! This is the driver's side of the format: list entries, look one up by
//! name, and read file contents at an offset.

use std::time::Duration;

use crate::block::{
    content_base, decode_latin1, BlockHeader, MetadataEntry, HEADER_SIZE, METADATA_ENTRY_SIZE,
};
use crate::classifier::EntryKind;
use crate::error::BlockError;

/// A validated view over an encoded block
#[derive(Debug)]
pub struct DecodedBlock<'a> {
    header: BlockHeader,
    entries: Vec<MetadataEntry>,
    data: &'a [u8],
}

impl<'a> DecodedBlock<'a> {
    /// Validate the header, every metadata entry and every content range
    pub fn parse(data: &'a [u8]) -> Result<Self, BlockError> {
        let header = BlockHeader::read(data)?;

        let count = usize::try_from(header.count).unwrap_or(usize::MAX);
        let needed = count
            .checked_mul(METADATA_ENTRY_SIZE)
            .and_then(|n| n.checked_add(HEADER_SIZE))
            .unwrap_or(usize::MAX);
        if data.len() < needed {
            return Err(BlockError::Truncated {
                needed,
                actual: data.len(),
            });
        }

        let mut entries: Vec<MetadataEntry> = Vec::with_capacity(count);
        for index in 0..count {
            let start = HEADER_SIZE + index * METADATA_ENTRY_SIZE;
            let entry = MetadataEntry::read(&data[start..start + METADATA_ENTRY_SIZE], index)?;

            // Flags are block-level: every entry must agree with the first
            if let Some(first) = entries.first() {
                if first.kind != entry.kind {
                    let (is_directory, is_file) = flags(entry.kind);
                    return Err(BlockError::InconsistentFlags {
                        index,
                        is_directory,
                        is_file,
                    });
                }
            }

            if entry.is_file() {
                let end = entry
                    .content_offset
                    .saturating_add(entry.content_size)
                    .saturating_add(1);
                let before_content = entry.content_offset < content_base(count) as u64;
                if before_content || end > data.len() as u64 {
                    return Err(BlockError::OutOfBounds {
                        index,
                        offset: entry.content_offset,
                        end,
                        len: data.len(),
                    });
                }
            }

            entries.push(entry);
        }

        Ok(Self {
            header,
            entries,
            data,
        })
    }

    pub fn fetched_at(&self) -> f64 {
        self.header.fetched_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Block-level entry kind; `None` for an empty block
    pub fn kind(&self) -> Option<EntryKind> {
        self.entries.first().map(|e| e.kind)
    }

    /// Entries in listing order
    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&MetadataEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Content bytes of a file entry, without the trailing NUL
    ///
    /// Empty for directories and for entries whose range falls outside this
    /// block (an entry taken from a different block).
    pub fn content(&self, entry: &MetadataEntry) -> &'a [u8] {
        if !entry.is_file() {
            return &[];
        }
        let data: &'a [u8] = self.data;
        let range = usize::try_from(entry.content_offset)
            .ok()
            .zip(usize::try_from(entry.content_size).ok())
            .and_then(|(start, size)| Some(start..start.checked_add(size)?));
        range.and_then(|r| data.get(r)).unwrap_or(&[])
    }

    /// Content of a file entry decoded back to text
    pub fn content_text(&self, name: &str) -> Result<String, BlockError> {
        let entry = self.file_entry(name)?;
        Ok(decode_latin1(self.content(entry)))
    }

    /// Up to `size` bytes of `name` starting at `offset`, clamped to the content
    pub fn read(&self, name: &str, offset: u64, size: usize) -> Result<&'a [u8], BlockError> {
        let entry = self.file_entry(name)?;
        let content = self.content(entry);

        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(content.len());
        let end = start.saturating_add(size).min(content.len());
        Ok(&content[start..end])
    }

    /// Whether the block is older than `ttl` at `now` (seconds since the epoch)
    pub fn is_stale(&self, now: f64, ttl: Duration) -> bool {
        now - self.header.fetched_at > ttl.as_secs_f64()
    }

    fn file_entry(&self, name: &str) -> Result<&MetadataEntry, BlockError> {
        let entry = self
            .find(name)
            .ok_or_else(|| BlockError::NotFound(name.to_string()))?;
        if !entry.is_file() {
            return Err(BlockError::NotAFile(name.to_string()));
        }
        Ok(entry)
    }
}

fn flags(kind: EntryKind) -> (i32, i32) {
    match kind {
        EntryKind::Directory => (1, 0),
        EntryKind::File => (0, 1),
    }
}
