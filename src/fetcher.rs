//! Concurrent section detail fetching
//!
//! Every leaf identifier gets its own detail query. Queries run concurrently
//! on the calling task; each result lands in the slot of its input index, so
//! the returned records follow the input order whatever order the network
//! answers in. The first failure drops every query still in flight.

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use crate::classifier::DetailedRecord;
use crate::client::CatalogClient;
use crate::error::{CatalogError, Result};
use crate::selector::SelectorPath;

pub struct DetailFetcher<'a, C: CatalogClient + ?Sized> {
    client: &'a C,
    max_in_flight: Option<usize>,
}

impl<'a, C: CatalogClient + ?Sized> DetailFetcher<'a, C> {
    /// Fetcher with unbounded fan-out
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            max_in_flight: None,
        }
    }

    /// Cap the number of concurrent detail queries
    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Fetch the body of every section in `ids`, in input order
    pub async fn fetch_all(
        &self,
        path: &SelectorPath,
        ids: &[String],
    ) -> Result<Vec<DetailedRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let total = ids.len();
        let width = self.max_in_flight.unwrap_or(total).clamp(1, total);
        debug!(
            "Fetching {} section details below {} via {} ({} in flight)",
            total,
            path,
            self.client.name(),
            width
        );

        let mut slots: Vec<Option<DetailedRecord>> = vec![None; total];
        let mut pending = ids.iter().enumerate();
        let mut in_flight = FuturesUnordered::new();

        for (index, id) in pending.by_ref().take(width) {
            in_flight.push(self.fetch_one(path, index, id));
        }

        while let Some((index, result)) = in_flight.next().await {
            match result {
                Ok(body) => {
                    slots[index] = Some(DetailedRecord::new(ids[index].as_str(), body));
                }
                Err(source) => {
                    warn!(
                        "Detail query for '{}' failed, cancelling {} in-flight queries: {}",
                        ids[index],
                        in_flight.len(),
                        source
                    );
                    return Err(CatalogError::PartialFetchFailure {
                        id: ids[index].clone(),
                        source: Box::new(source),
                    });
                }
            }

            if let Some((index, id)) = pending.next() {
                in_flight.push(self.fetch_one(path, index, id));
            }
        }

        let records: Vec<DetailedRecord> = slots.into_iter().flatten().collect();
        debug_assert_eq!(records.len(), total);
        Ok(records)
    }

    async fn fetch_one(
        &self,
        path: &SelectorPath,
        index: usize,
        id: &str,
    ) -> (usize, Result<String>) {
        let result = self
            .client
            .section_detail(path, id)
            .await
            .map(|detail| detail.body());
        (index, result)
    }
}
