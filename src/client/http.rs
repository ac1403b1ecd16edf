//! HTTP backend for the course catalog
//!
//! Listings map onto `{base}/{year}/{term}/....xml`; the empty path is
//! `{base}.xml`. One `reqwest::Client` is shared by every query, so concurrent
//! detail queries reuse the same connection pool.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{xml, CatalogClient, CatalogItem, SectionDetail};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::selector::SelectorPath;

/// Live catalog backend
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CatalogError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the listing one level below `path`
    pub fn listing_url(&self, path: &SelectorPath) -> String {
        if path.is_empty() {
            format!("{}.xml", self.base_url)
        } else {
            format!("{}/{}.xml", self.base_url, path.selectors().join("/"))
        }
    }

    /// URL of one section's detail document
    pub fn section_url(&self, path: &SelectorPath, section_id: &str) -> String {
        format!(
            "{}/{}/{}.xml",
            self.base_url,
            path.selectors().join("/"),
            section_id
        )
    }

    async fn fetch_document(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            CatalogError::UpstreamUnavailable {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Catalog returned {} for {}", status, url);
            return Err(CatalogError::UpstreamUnavailable {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        response
            .text()
            .await
            .map_err(|e| CatalogError::UpstreamUnavailable {
                url: url.to_string(),
                reason: format!("Failed to read response body: {e}"),
            })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list(&self, path: &SelectorPath) -> Result<Vec<CatalogItem>> {
        let url = self.listing_url(path);
        let content = self.fetch_document(&url).await?;

        let items = xml::parse_listing(&content, path.listing_tag())
            .map_err(|reason| CatalogError::MalformedDocument { url: url.clone(), reason })?;

        debug!(
            "Listed {} <{}> elements from {}",
            items.len(),
            path.listing_tag(),
            url
        );
        Ok(items)
    }

    async fn section_detail(
        &self,
        path: &SelectorPath,
        section_id: &str,
    ) -> Result<SectionDetail> {
        if !path.is_leaf() {
            return Err(CatalogError::InvalidSelector(format!(
                "section details need a full year/term/subject/course path, got {path}"
            )));
        }

        let url = self.section_url(path, section_id);
        let content = self.fetch_document(&url).await?;

        xml::parse_section_detail(&content)
            .map_err(|reason| CatalogError::MalformedDocument { url, reason })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
