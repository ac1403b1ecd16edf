//! List command: resolve a selector path and emit its block
//!
//! The block goes to stdout (or `--output`) in a single write once the whole
//! listing has been resolved and encoded. On any failure nothing is written,
//! so the driver can tell "no result" apart from an empty listing.

use std::io::{self, Write};
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::CommandHandler;
use crate::client::HttpCatalogClient;
use crate::config::CatalogConfig;
use crate::selector::{ListingRequest, SelectorPath};
use crate::service::ListingService;
use crate::Result;

/// Handler for the `list` command
pub struct ListCommand {
    pub request: ListingRequest,
    pub output: Option<PathBuf>,
    pub config: CatalogConfig,
}

#[async_trait]
impl CommandHandler for ListCommand {
    async fn execute(&self) -> Result<()> {
        let client = HttpCatalogClient::new(&self.config)?;
        let service = ListingService::new(client, &self.config);

        match &self.output {
            Some(path) => {
                // Encode before creating the file so failures leave no file behind
                let block = service.encode(&self.request).await?;
                debug!("Writing {} bytes to {}", block.len(), path.display());
                let mut file = std::fs::File::create(path)?;
                file.write_all(&block)?;
                file.flush()?;
            }
            None => {
                service.write_block(&self.request, &mut io::stdout()).await?;
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "list"
    }
}

impl ListCommand {
    /// Build the command from CLI arguments, applying flag overrides to `config`
    pub fn new(
        selectors: Vec<String>,
        detail: bool,
        output: Option<PathBuf>,
        base_url: Option<String>,
        max_in_flight: Option<usize>,
        mut config: CatalogConfig,
    ) -> Result<Self> {
        if let Some(base_url) = base_url {
            config.base_url = base_url;
        }
        if max_in_flight.is_some() {
            config.max_in_flight = max_in_flight;
        }
        config.validate()?;

        let path = SelectorPath::new(selectors)?;
        Ok(Self {
            request: ListingRequest::new(path, detail),
            output,
            config,
        })
    }
}
