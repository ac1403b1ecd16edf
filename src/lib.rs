//! coursefs - course catalog listings as self-describing binary blocks
//!
//! A selector path (year, term, subject, course) is resolved against the
//! upstream catalog, classified into names, identifiers or detailed section
//! records, and encoded into a block a filesystem driver can read without
//! knowing anything about the catalog.

pub mod block;
pub mod classifier;
pub mod cli;
pub mod client;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod fetcher;
pub mod selector;
pub mod service;

pub use classifier::{classify, Classified, DetailedRecord, EntryKind, ResultShape};
pub use client::{CatalogClient, CatalogItem, HttpCatalogClient, SectionDetail};
pub use config::CatalogConfig;
pub use decoder::DecodedBlock;
pub use encoder::{Encoder, TextPolicy};
pub use error::{BlockError, CatalogError, Result};
pub use fetcher::DetailFetcher;
pub use selector::{ListingRequest, SelectorPath};
pub use service::ListingService;
