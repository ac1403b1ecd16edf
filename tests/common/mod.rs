//! Shared in-memory catalog for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use coursefs::{CatalogClient, CatalogError, CatalogItem, Result, SectionDetail, SelectorPath};

/// Scripted section answer
#[derive(Clone)]
pub struct SectionScript {
    pub delay: Duration,
    pub detail: Option<SectionDetail>,
}

/// Catalog keyed by selector path string (e.g. "/2025/spring")
#[derive(Default)]
pub struct InMemoryCatalog {
    listings: HashMap<String, Vec<CatalogItem>>,
    sections: HashMap<String, SectionScript>,
    pub detail_calls: Mutex<Vec<String>>,
    pub completed: Mutex<Vec<String>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, path: &str, items: &[(Option<&str>, &str)]) -> Self {
        self.listings.insert(
            path.to_string(),
            items
                .iter()
                .map(|(id, text)| CatalogItem::new(*id, text))
                .collect(),
        );
        self
    }

    pub fn with_section(mut self, id: &str, delay_ms: u64, detail: Option<SectionDetail>) -> Self {
        self.sections.insert(
            id.to_string(),
            SectionScript {
                delay: Duration::from_millis(delay_ms),
                detail,
            },
        );
        self
    }

    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn list(&self, path: &SelectorPath) -> Result<Vec<CatalogItem>> {
        self.listings
            .get(&path.to_string())
            .cloned()
            .ok_or_else(|| CatalogError::UpstreamUnavailable {
                url: format!("memory:{path}"),
                reason: "HTTP 404 Not Found".to_string(),
            })
    }

    async fn section_detail(
        &self,
        _path: &SelectorPath,
        section_id: &str,
    ) -> Result<SectionDetail> {
        self.detail_calls
            .lock()
            .unwrap()
            .push(section_id.to_string());

        let script = self.sections.get(section_id).cloned().ok_or_else(|| {
            CatalogError::UpstreamUnavailable {
                url: format!("memory:{section_id}"),
                reason: "unknown section".to_string(),
            }
        })?;

        tokio::time::sleep(script.delay).await;

        match script.detail {
            Some(detail) => {
                self.completed.lock().unwrap().push(section_id.to_string());
                Ok(detail)
            }
            None => Err(CatalogError::UpstreamUnavailable {
                url: format!("memory:{section_id}"),
                reason: "HTTP 500 Internal Server Error".to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Section detail with the given instructors as (last, first) pairs
pub fn section(label: &str, description: &str, instructors: &[(&str, &str)]) -> SectionDetail {
    let mut detail = SectionDetail {
        label: label.to_string(),
        description: description.to_string(),
        ..Default::default()
    };
    for (last, first) in instructors {
        detail.add_instructor(last, first);
    }
    detail
}

pub fn u64_at(buf: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(buf[offset..offset + 8].try_into().unwrap())
}

pub fn i32_at(buf: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
}
