use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::CommandHandler;
use crate::block::MetadataEntry;
use crate::decoder::DecodedBlock;
use crate::encoder::now_seconds;
use crate::Result;

/// Handler for the `inspect` command
pub struct InspectCommand {
    pub file: PathBuf,
    pub json: bool,
    pub stale_after: Duration,
}

/// JSON view of one entry
#[derive(Debug, Serialize)]
struct EntryView<'a> {
    name: &'a str,
    kind: &'static str,
    content_size: u64,
    content_offset: u64,
}

#[derive(Debug, Serialize)]
struct BlockView<'a> {
    count: usize,
    fetched_at: f64,
    stale: bool,
    entries: Vec<EntryView<'a>>,
}

#[async_trait]
impl CommandHandler for InspectCommand {
    async fn execute(&self) -> Result<()> {
        let bytes = std::fs::read(&self.file)?;
        let block = DecodedBlock::parse(&bytes)?;

        if self.json {
            let view = self.block_view(&block);
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            self.print_entries_table(&block);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "inspect"
    }
}

impl InspectCommand {
    pub fn new(file: PathBuf, json: bool, stale_after: Duration) -> Self {
        Self {
            file,
            json,
            stale_after,
        }
    }

    fn block_view<'a>(&self, block: &'a DecodedBlock<'_>) -> BlockView<'a> {
        BlockView {
            count: block.len(),
            fetched_at: block.fetched_at(),
            stale: block.is_stale(now_seconds(), self.stale_after),
            entries: block
                .entries()
                .iter()
                .map(|e| EntryView {
                    name: &e.name,
                    kind: kind_label(e),
                    content_size: e.content_size,
                    content_offset: e.content_offset,
                })
                .collect(),
        }
    }

    /// Print entries in compact table format
    fn print_entries_table(&self, block: &DecodedBlock<'_>) {
        let fetched = DateTime::<Utc>::from_timestamp(block.fetched_at() as i64, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| format!("{:.0}", block.fetched_at()));
        let stale = if block.is_stale(now_seconds(), self.stale_after) {
            " (stale)"
        } else {
            ""
        };
        println!("Fetched: {fetched}{stale}");

        if block.is_empty() {
            println!("No entries.");
            return;
        }

        let name_width = block
            .entries()
            .iter()
            .map(|e| e.name.len())
            .max()
            .unwrap_or(4)
            .max(4); // "NAME"

        println!(
            "{:<name_width$} {:<4} {:>10} {:>12}",
            "NAME",
            "KIND",
            "SIZE",
            "OFFSET",
            name_width = name_width
        );
        println!(
            "{} {} {} {}",
            "-".repeat(name_width),
            "-".repeat(4),
            "-".repeat(10),
            "-".repeat(12)
        );

        for entry in block.entries() {
            println!(
                "{:<name_width$} {:<4} {:>10} {:>12}",
                entry.name,
                kind_label(entry),
                entry.content_size,
                entry.content_offset,
                name_width = name_width
            );
        }

        println!("\nTotal: {} entries", block.len());
    }
}

fn kind_label(entry: &MetadataEntry) -> &'static str {
    if entry.is_directory() {
        "dir"
    } else {
        "file"
    }
}
