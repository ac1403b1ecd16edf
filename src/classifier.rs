//! Result classification
//!
//! Turns a raw upstream listing into one homogeneous [`ResultShape`].

use tracing::warn;

use crate::client::CatalogItem;
use crate::error::{CatalogError, Result};
use crate::selector::ListingRequest;

/// A leaf record: section identifier plus its full text body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailedRecord {
    pub id: String,
    pub body: String,
}

impl DetailedRecord {
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
        }
    }
}

/// Whether the entries of a block are directories or files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One listing, always a single variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultShape {
    /// Bare tokens such as calendar years
    Names(Vec<String>),
    /// Opaque directory keys: terms, subjects, courses, or sections without detail
    Identifiers(Vec<String>),
    /// Leaf records with their text bodies
    DetailedRecords(Vec<DetailedRecord>),
}

impl ResultShape {
    pub fn len(&self) -> usize {
        match self {
            ResultShape::Names(names) => names.len(),
            ResultShape::Identifiers(ids) => ids.len(),
            ResultShape::DetailedRecords(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            ResultShape::Names(_) | ResultShape::Identifiers(_) => EntryKind::Directory,
            ResultShape::DetailedRecords(_) => EntryKind::File,
        }
    }

    /// Entry names in listing order
    pub fn names(&self) -> Vec<&str> {
        match self {
            ResultShape::Names(names) => names.iter().map(String::as_str).collect(),
            ResultShape::Identifiers(ids) => ids.iter().map(String::as_str).collect(),
            ResultShape::DetailedRecords(records) => {
                records.iter().map(|r| r.id.as_str()).collect()
            }
        }
    }
}

/// Classifier output: a finished shape, or leaf identifiers awaiting bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Shape(ResultShape),
    PendingDetail(Vec<String>),
}

/// Assign a listing its shape from the depth of the request that produced it
pub fn classify(items: &[CatalogItem], request: &ListingRequest) -> Result<Classified> {
    if request.depth() == 1 {
        let names = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match item.text.split_whitespace().next() {
                Some(token) => Some(token.to_string()),
                None => {
                    warn!("Skipping listing item {} with empty text", index);
                    None
                }
            })
            .collect();
        return Ok(Classified::Shape(ResultShape::Names(names)));
    }

    let ids = identifiers(items)?;
    if request.wants_detail() {
        Ok(Classified::PendingDetail(ids))
    } else {
        Ok(Classified::Shape(ResultShape::Identifiers(ids)))
    }
}

fn identifiers(items: &[CatalogItem]) -> Result<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.id
                .clone()
                .ok_or(CatalogError::MissingIdentifier { index })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::SelectorPath;
    use pretty_assertions::assert_eq;

    fn request(selectors: &[&str], detail: bool) -> ListingRequest {
        ListingRequest::new(SelectorPath::new(selectors.iter().copied()).unwrap(), detail)
    }

    #[test]
    fn test_years_keep_leading_token() {
        let items = vec![
            CatalogItem::new(Some("2025"), "2025 Fall"),
            CatalogItem::new(Some("2026"), "2026 Spring"),
        ];

        let classified = classify(&items, &request(&[], false)).unwrap();
        assert_eq!(
            classified,
            Classified::Shape(ResultShape::Names(vec![
                "2025".to_string(),
                "2026".to_string()
            ]))
        );
    }

    #[test]
    fn test_middle_depths_use_identifiers() {
        let items = vec![
            CatalogItem::new(Some("AAS"), "Asian American Studies"),
            CatalogItem::new(Some("CS"), "Computer Science"),
        ];

        let classified = classify(&items, &request(&["2025", "spring"], true)).unwrap();
        assert_eq!(
            classified,
            Classified::Shape(ResultShape::Identifiers(vec![
                "AAS".to_string(),
                "CS".to_string()
            ]))
        );
    }

    #[test]
    fn test_leaf_with_detail_is_pending() {
        let items = vec![CatalogItem::new(Some("31187"), "AL1")];
        let leaf = ["2025", "spring", "CS", "341"];

        assert_eq!(
            classify(&items, &request(&leaf, true)).unwrap(),
            Classified::PendingDetail(vec!["31187".to_string()])
        );
        assert_eq!(
            classify(&items, &request(&leaf, false)).unwrap(),
            Classified::Shape(ResultShape::Identifiers(vec!["31187".to_string()]))
        );
    }

    #[test]
    fn test_missing_identifier() {
        let items = vec![
            CatalogItem::new(Some("CS"), "Computer Science"),
            CatalogItem::new(None, "Mystery"),
        ];

        let result = classify(&items, &request(&["2025", "spring"], false));
        assert!(matches!(
            result,
            Err(CatalogError::MissingIdentifier { index: 1 })
        ));
    }

    #[test]
    fn test_empty_listing_is_empty_shape() {
        let names = classify(&[], &request(&[], false)).unwrap();
        assert_eq!(names, Classified::Shape(ResultShape::Names(vec![])));

        let ids = classify(&[], &request(&["2025"], false)).unwrap();
        assert_eq!(ids, Classified::Shape(ResultShape::Identifiers(vec![])));
    }

    #[test]
    fn test_shape_kind() {
        assert_eq!(ResultShape::Names(vec![]).kind(), EntryKind::Directory);
        assert_eq!(ResultShape::Identifiers(vec![]).kind(), EntryKind::Directory);
        assert_eq!(
            ResultShape::DetailedRecords(vec![DetailedRecord::new("1", "x")]).kind(),
            EntryKind::File
        );
    }
}
