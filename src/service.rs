//! Listing pipeline: client -> classifier -> detail fetcher -> encoder

use std::io::Write;

use tracing::{debug, info};

use crate::classifier::{classify, Classified, ResultShape};
use crate::client::CatalogClient;
use crate::config::CatalogConfig;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::fetcher::DetailFetcher;
use crate::selector::ListingRequest;

pub struct ListingService<C: CatalogClient> {
    client: C,
    encoder: Encoder,
    max_in_flight: Option<usize>,
}

impl<C: CatalogClient> ListingService<C> {
    pub fn new(client: C, config: &CatalogConfig) -> Self {
        Self {
            client,
            encoder: Encoder::new(config.text_policy),
            max_in_flight: config.max_in_flight,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Query the catalog and produce the finished shape for `request`
    pub async fn resolve(&self, request: &ListingRequest) -> Result<ResultShape> {
        if request.detail && !request.path.is_leaf() {
            debug!(
                "Ignoring detail flag at depth {} for {}",
                request.depth(),
                request.path
            );
        }

        let items = self.client.list(&request.path).await?;

        match classify(&items, request)? {
            Classified::Shape(shape) => Ok(shape),
            Classified::PendingDetail(ids) => {
                let records = DetailFetcher::new(&self.client)
                    .with_max_in_flight(self.max_in_flight)
                    .fetch_all(&request.path, &ids)
                    .await?;
                Ok(ResultShape::DetailedRecords(records))
            }
        }
    }

    /// Resolve `request` and encode it into a block
    pub async fn encode(&self, request: &ListingRequest) -> Result<Vec<u8>> {
        let shape = self.resolve(request).await?;
        self.encoder.encode(&shape)
    }

    /// Resolve, encode, and write the block; nothing is written on failure
    pub async fn write_block<W: Write>(
        &self,
        request: &ListingRequest,
        writer: &mut W,
    ) -> Result<usize> {
        let block = self.encode(request).await?;
        writer.write_all(&block)?;
        writer.flush()?;

        info!(
            "Wrote {}-byte block for {}{}",
            block.len(),
            request.path,
            if request.wants_detail() { " (detail)" } else { "" }
        );
        Ok(block.len())
    }
}
