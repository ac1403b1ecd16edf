//! Binary block encoder
//!
//! Serializes a [`ResultShape`] into the block layout described in
//! [`crate::block`]. The whole block is built and validated in memory first,
//! so a failed encode never leaves a partial block behind.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::block::{
    content_base, write_entry, BlockHeader, HEADER_SIZE, MAX_NAME_LEN, METADATA_ENTRY_SIZE,
};
use crate::classifier::ResultShape;
use crate::error::{CatalogError, Result};

/// Handling of characters outside ISO-8859-1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPolicy {
    /// Fail the encode on the first unencodable character
    #[default]
    Reject,
    /// Substitute `?` and log how many characters were replaced
    Replace,
}

const REPLACEMENT_BYTE: u8 = b'?';

#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    policy: TextPolicy,
}

impl Encoder {
    pub fn new(policy: TextPolicy) -> Self {
        Self { policy }
    }

    /// Encode with the current wall-clock time as `fetched_at`
    pub fn encode(&self, shape: &ResultShape) -> Result<Vec<u8>> {
        self.encode_at(shape, now_seconds())
    }

    /// Encode with an explicit `fetched_at` (seconds since the epoch)
    pub fn encode_at(&self, shape: &ResultShape, fetched_at: f64) -> Result<Vec<u8>> {
        let count = shape.len();
        let mut buf = Vec::with_capacity(HEADER_SIZE + count * METADATA_ENTRY_SIZE);

        BlockHeader {
            count: count as u64,
            fetched_at,
        }
        .write_to(&mut buf);

        if count == 0 {
            return Ok(buf);
        }

        let kind = shape.kind();
        let mut replaced = 0usize;

        match shape {
            ResultShape::Names(names) | ResultShape::Identifiers(names) => {
                for name in names {
                    let path = self.encode_name(name, &mut replaced)?;
                    write_entry(&mut buf, &path, 0, 0, kind);
                }
            }
            ResultShape::DetailedRecords(records) => {
                let mut bodies = Vec::with_capacity(records.len());
                let mut offset = content_base(count) as u64;

                for record in records {
                    let path = self.encode_name(&record.id, &mut replaced)?;
                    let body = self.encode_text(
                        &record.body,
                        || format!("body of '{}'", record.id),
                        &mut replaced,
                    )?;

                    let size = body.len() as u64;
                    write_entry(&mut buf, &path, size, offset, kind);
                    offset += size + 1;
                    bodies.push(body);
                }

                for body in bodies {
                    buf.extend_from_slice(&body);
                    buf.push(0);
                }
            }
        }

        if replaced > 0 {
            warn!(
                "Replaced {} characters outside ISO-8859-1 with '?'",
                replaced
            );
        }

        debug!("Encoded {} {:?} entries into {} bytes", count, kind, buf.len());
        Ok(buf)
    }

    fn encode_name(&self, name: &str, replaced: &mut usize) -> Result<Vec<u8>> {
        let bytes = self.encode_text(name, || format!("name '{name}'"), replaced)?;

        if bytes.contains(&0) {
            return Err(CatalogError::UnencodableText {
                ch: '\0',
                context: format!("name '{}'", name.escape_debug()),
            });
        }

        if bytes.len() > MAX_NAME_LEN {
            return Err(CatalogError::EncodingOverflow {
                name: name.to_string(),
                len: bytes.len(),
                max: MAX_NAME_LEN,
            });
        }

        Ok(bytes)
    }

    fn encode_text<F>(&self, text: &str, context: F, replaced: &mut usize) -> Result<Vec<u8>>
    where
        F: Fn() -> String,
    {
        let mut out = Vec::with_capacity(text.len());
        for ch in text.chars() {
            match u8::try_from(u32::from(ch)) {
                Ok(byte) => out.push(byte),
                Err(_) => match self.policy {
                    TextPolicy::Reject => {
                        return Err(CatalogError::UnencodableText {
                            ch,
                            context: context(),
                        })
                    }
                    TextPolicy::Replace => {
                        out.push(REPLACEMENT_BYTE);
                        *replaced += 1;
                    }
                },
            }
        }
        Ok(out)
    }
}

/// Current time as fractional seconds since the Unix epoch
pub fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::DetailedRecord;
    use pretty_assertions::assert_eq;

    fn u64_at(buf: &[u8], offset: usize) -> u64 {
        u64::from_le_bytes(buf[offset..offset + 8].try_into().unwrap())
    }

    fn i32_at(buf: &[u8], offset: usize) -> i32 {
        i32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_empty_shape_is_header_only() {
        let encoder = Encoder::default();
        for shape in [
            ResultShape::Names(vec![]),
            ResultShape::Identifiers(vec![]),
            ResultShape::DetailedRecords(vec![]),
        ] {
            let block = encoder.encode_at(&shape, 12.5).unwrap();
            assert_eq!(block.len(), HEADER_SIZE);
            assert_eq!(u64_at(&block, 0), 0);
            assert_eq!(f64::from_le_bytes(block[8..16].try_into().unwrap()), 12.5);
        }
    }

    #[test]
    fn test_directory_entries() {
        let shape = ResultShape::Names(vec!["2025".to_string(), "2026".to_string()]);
        let block = Encoder::default().encode_at(&shape, 0.0).unwrap();

        assert_eq!(block.len(), HEADER_SIZE + 2 * METADATA_ENTRY_SIZE);
        assert_eq!(u64_at(&block, 0), 2);
        for (i, name) in ["2025", "2026"].iter().enumerate() {
            let entry = HEADER_SIZE + i * METADATA_ENTRY_SIZE;
            assert_eq!(&block[entry..entry + 5], format!("{name}\0").as_bytes());
            assert_eq!(u64_at(&block, entry + 4096), 0);
            assert_eq!(u64_at(&block, entry + 4104), 0);
            assert_eq!(i32_at(&block, entry + 4112), 1);
            assert_eq!(i32_at(&block, entry + 4116), 0);
        }
    }

    #[test]
    fn test_content_offsets_accumulate() {
        let shape = ResultShape::DetailedRecords(vec![
            DetailedRecord::new("A", "abc"),
            DetailedRecord::new("B", ""),
            DetailedRecord::new("C", "hello"),
        ]);
        let block = Encoder::default().encode_at(&shape, 0.0).unwrap();

        let base = content_base(3) as u64;
        let entry = |i: usize| HEADER_SIZE + i * METADATA_ENTRY_SIZE;
        assert_eq!(u64_at(&block, entry(0) + 4104), base);
        assert_eq!(u64_at(&block, entry(1) + 4104), base + 4);
        assert_eq!(u64_at(&block, entry(2) + 4104), base + 5);
        assert_eq!(u64_at(&block, entry(2) + 4096), 5);
        assert_eq!(i32_at(&block, entry(0) + 4116), 1);

        assert_eq!(&block[base as usize..], b"abc\0\0hello\0");
    }

    #[test]
    fn test_name_length_boundary() {
        let encoder = Encoder::default();

        let fits = ResultShape::Identifiers(vec!["x".repeat(MAX_NAME_LEN)]);
        let block = encoder.encode_at(&fits, 0.0).unwrap();
        assert_eq!(block[HEADER_SIZE + MAX_NAME_LEN], 0);

        let too_long = ResultShape::Identifiers(vec!["x".repeat(MAX_NAME_LEN + 1)]);
        match encoder.encode_at(&too_long, 0.0) {
            Err(CatalogError::EncodingOverflow { len, max, .. }) => {
                assert_eq!(len, 4096);
                assert_eq!(max, 4095);
            }
            other => panic!("expected EncodingOverflow, got {other:?}"),
        }
    }

    #[test]
    fn test_latin1_counts_bytes_not_utf8() {
        // 4095 'é' are 8190 UTF-8 bytes but 4095 encoded bytes
        let shape = ResultShape::Identifiers(vec!["é".repeat(MAX_NAME_LEN)]);
        let block = Encoder::default().encode_at(&shape, 0.0).unwrap();
        assert_eq!(block[HEADER_SIZE], 0xE9);
    }

    #[test]
    fn test_reject_policy() {
        let shape = ResultShape::DetailedRecords(vec![DetailedRecord::new("1", "naïve → done")]);
        match Encoder::new(TextPolicy::Reject).encode_at(&shape, 0.0) {
            Err(CatalogError::UnencodableText { ch, context }) => {
                assert_eq!(ch, '→');
                assert!(context.contains("body of '1'"));
            }
            other => panic!("expected UnencodableText, got {other:?}"),
        }
    }

    #[test]
    fn test_replace_policy() {
        let shape = ResultShape::DetailedRecords(vec![DetailedRecord::new("1", "a→b")]);
        let block = Encoder::new(TextPolicy::Replace).encode_at(&shape, 0.0).unwrap();

        assert_eq!(u64_at(&block, HEADER_SIZE + 4096), 3);
        assert_eq!(&block[content_base(1)..], b"a?b\0");
    }

    #[test]
    fn test_nul_in_name_rejected() {
        let shape = ResultShape::Identifiers(vec!["bad\0name".to_string()]);
        let result = Encoder::new(TextPolicy::Replace).encode_at(&shape, 0.0);
        assert!(matches!(
            result,
            Err(CatalogError::UnencodableText { ch: '\0', .. })
        ));
    }

    #[test]
    fn test_late_unencodable_name_fails_whole_block() {
        let shape = ResultShape::Identifiers(vec!["ok".to_string(), "日本".to_string()]);
        assert!(matches!(
            Encoder::default().encode_at(&shape, 0.0),
            Err(CatalogError::UnencodableText { ch: '日', .. })
        ));
    }
}
