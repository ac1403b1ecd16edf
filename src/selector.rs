//! Selector paths and listing requests
//!
//! A selector path narrows the catalog from calendar years down to a single
//! course. Its length decides which entity kind a listing returns:
//!
//! ```text
//! []                           -> calendar years   (depth 1)
//! [year]                       -> terms            (depth 2)
//! [year, term]                 -> subjects         (depth 3)
//! [year, term, subject]        -> courses          (depth 4)
//! [year, term, subject, course]-> sections         (depth 5, leaf)
//! ```

use std::fmt;

use crate::error::{CatalogError, Result};

/// Maximum number of selectors in a path.
pub const MAX_SELECTORS: usize = 4;

/// Depth of the leaf (section) listing.
pub const MAX_DEPTH: usize = MAX_SELECTORS + 1;

/// Upstream element tag listed at each depth, indexed by `depth - 1`.
const LEVEL_TAGS: [&str; MAX_DEPTH] = ["calendarYear", "term", "subject", "course", "section"];

/// Ordered year/term/subject/course prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorPath {
    selectors: Vec<String>,
}

impl SelectorPath {
    /// The empty path, listing calendar years
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from positional selectors
    pub fn new<I, S>(selectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selectors: Vec<String> = selectors.into_iter().map(Into::into).collect();

        if selectors.len() > MAX_SELECTORS {
            return Err(CatalogError::InvalidSelector(format!(
                "expected at most {} selectors, got {}",
                MAX_SELECTORS,
                selectors.len()
            )));
        }

        for (position, selector) in selectors.iter().enumerate() {
            let trimmed = selector.trim();
            if trimmed.is_empty() {
                return Err(CatalogError::InvalidSelector(format!(
                    "selector {} is empty",
                    position + 1
                )));
            }
            if trimmed.contains('/') {
                return Err(CatalogError::InvalidSelector(format!(
                    "selector '{trimmed}' contains '/'"
                )));
            }
        }

        Ok(Self {
            selectors: selectors.into_iter().map(|s| s.trim().to_string()).collect(),
        })
    }

    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Listing depth produced by this path (1 = years, 5 = sections)
    pub fn depth(&self) -> usize {
        self.selectors.len() + 1
    }

    /// Whether a listing of this path reaches the section level
    pub fn is_leaf(&self) -> bool {
        self.depth() == MAX_DEPTH
    }

    /// Upstream element tag listed at this path's depth
    pub fn listing_tag(&self) -> &'static str {
        LEVEL_TAGS[self.selectors.len()]
    }
}

impl fmt::Display for SelectorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.selectors.join("/"))
    }
}

/// One listing to resolve, passed unchanged through the whole pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub path: SelectorPath,
    /// Fetch full section text at the leaf depth
    pub detail: bool,
}

impl ListingRequest {
    pub fn new(path: SelectorPath, detail: bool) -> Self {
        Self { path, detail }
    }

    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// True when the listing must be enriched by the detail fetcher
    pub fn wants_detail(&self) -> bool {
        self.detail && self.path.is_leaf()
    }
}
