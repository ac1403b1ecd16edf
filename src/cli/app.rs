use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// coursefs: course catalog listings for a filesystem driver
#[derive(Parser, Debug)]
#[command(name = "coursefs")]
#[command(version)]
#[command(about = "Encode course catalog listings as binary blocks")]
#[command(
    long_about = "coursefs resolves a year/term/subject/course path against the course catalog and writes a self-describing block of directory or file entries for a filesystem driver."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (logs go to stderr)
    #[arg(long, value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a selector path and write its block
    List {
        /// Up to four selectors: YEAR TERM SUBJECT COURSE
        #[arg(num_args = 0..=4)]
        selectors: Vec<String>,

        /// Fetch full section text at the course level
        #[arg(short, long)]
        detail: bool,

        /// Write the block to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the catalog base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Cap the number of concurrent detail queries
        #[arg(long)]
        max_in_flight: Option<usize>,
    },

    /// Decode a block file and print its entries
    Inspect {
        /// Block file to read
        file: PathBuf,

        /// Output entries as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
