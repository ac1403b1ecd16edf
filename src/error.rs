use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Upstream catalog unavailable at {url}: {reason}")]
    UpstreamUnavailable { url: String, reason: String },

    #[error("Malformed catalog document from {url}: {reason}")]
    MalformedDocument { url: String, reason: String },

    #[error("Invalid selector path: {0}")]
    InvalidSelector(String),

    #[error("Listing item {index} has no identifier attribute")]
    MissingIdentifier { index: usize },

    #[error("Detail query for '{id}' failed: {source}")]
    PartialFetchFailure {
        id: String,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("Name of {len} bytes exceeds the {max}-byte path field: {name:.64}")]
    EncodingOverflow {
        name: String,
        len: usize,
        max: usize,
    },

    #[error("Character {ch:?} cannot be encoded in {context}")]
    UnencodableText { ch: char, context: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid block: {0}")]
    Block(#[from] BlockError),

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Failures while reading an encoded block back.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BlockError {
    #[error("Block truncated: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("Entry {index} content [{offset}, {end}) lies outside the {len}-byte block")]
    OutOfBounds {
        index: usize,
        offset: u64,
        end: u64,
        len: usize,
    },

    #[error("Entry {index} has inconsistent flags (isDirectory={is_directory}, isFile={is_file})")]
    InconsistentFlags {
        index: usize,
        is_directory: i32,
        is_file: i32,
    },

    #[error("Entry {index} path is not NUL-terminated")]
    UnterminatedPath { index: usize },

    #[error("No entry named '{0}'")]
    NotFound(String),

    #[error("'{0}' is a directory, not a file")]
    NotAFile(String),
}
