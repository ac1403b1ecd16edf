//! Catalog client - Abstraction over the upstream course catalog
//!
//! The core only needs two queries from the catalog:
//! - a listing of the entities one level below a selector path
//! - the detail document of a single section at the leaf level
//!
//! `HttpCatalogClient` talks to the live XML service. Tests provide their own
//! in-memory implementations of [`CatalogClient`].

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::selector::SelectorPath;

mod http;
pub mod xml;

pub use http::HttpCatalogClient;

/// One element of an upstream listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// The element's `id` attribute, if present
    pub id: Option<String>,
    /// The element's text content
    pub text: String,
}

impl CatalogItem {
    pub fn new(id: Option<&str>, text: &str) -> Self {
        Self {
            id: id.map(str::to_string),
            text: text.to_string(),
        }
    }
}

/// Parsed result of one section detail query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionDetail {
    pub label: String,
    pub description: String,
    /// Instructor names formatted `Lastname F.`, deduplicated
    pub instructors: BTreeSet<String>,
}

impl SectionDetail {
    /// Add an instructor from raw name parts; blank last names are ignored
    pub fn add_instructor(&mut self, last_name: &str, first_name: &str) {
        if let Some(name) = format_instructor(last_name, first_name) {
            self.instructors.insert(name);
        }
    }

    /// File body handed to the driver: label, description, then instructors
    pub fn body(&self) -> String {
        let instructors: Vec<&str> = self.instructors.iter().map(String::as_str).collect();
        format!(
            "{}\n{}\n\n{}",
            self.label,
            self.description,
            instructors.join(", ")
        )
    }
}

/// Format an instructor as `Lastname F.`
pub fn format_instructor(last_name: &str, first_name: &str) -> Option<String> {
    let last = last_name.trim();
    if last.is_empty() {
        return None;
    }

    match first_name.trim().chars().next() {
        Some(initial) => Some(format!("{last} {initial}.")),
        None => Some(last.to_string()),
    }
}

/// Trait for upstream catalog access
///
/// Implementations fail with `UpstreamUnavailable` when the service returns a
/// non-success status or the transport fails, so callers can tell a missing
/// listing apart from an empty one.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// List the entities one level below `path`
    async fn list(&self, path: &SelectorPath) -> Result<Vec<CatalogItem>>;

    /// Fetch the detail document of one section below a leaf `path`
    async fn section_detail(&self, path: &SelectorPath, section_id: &str)
        -> Result<SectionDetail>;

    /// Client identifier for logging
    fn name(&self) -> &'static str;
}
