use std::sync::Arc;

use tracing::{error, info, warn};
use url::Url;

use crate::config::Config;
use crate::crawler::api;
use crate::crawler::fetcher::{Fetcher, RetryPolicy};
use crate::crawler::models::Product;
use crate::crawler::parser::{self, ProductTile};
use crate::crawler::proxy::ProxyPool;
use crate::error::ScrapeError;
use crate::storage::json_file;

pub struct ScrapingService {
    cfg: Config,
    proxies: Arc<ProxyPool>,
    policy: RetryPolicy,
}

impl ScrapingService {
    pub fn new(cfg: Config, proxies: ProxyPool) -> Self {
        Self {
            cfg,
            proxies: Arc::new(proxies),
            policy: RetryPolicy::default(),
        }
    }

    /// Overrides the retry timing; tests cannot afford the production
    /// inter-attempt delay.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs the html pipeline, then the API pipeline. A failed pipeline is
    /// reported and does not keep the other from running.
    pub async fn run(&self) -> anyhow::Result<()> {
        if let Err(e) = self.run_html_pipeline().await {
            error!(error = %e, "Html pipeline failed");
        }
        if let Err(e) = self.run_api_pipeline().await {
            error!(error = %e, "API pipeline failed");
        }
        Ok(())
    }

    pub async fn run_html_pipeline(&self) -> anyhow::Result<()> {
        info!("Starting html pipeline");
        info!("It could take a few minutes");

        let fetcher = Fetcher::new(&self.cfg.html_user_agent, self.proxies.clone());
        let listing = fetcher
            .fetch(&self.cfg.html_url, &self.policy, self.cfg.use_proxy)
            .await?;

        let tiles = parser::extract_tiles(&listing);
        info!(count = tiles.len(), "Found product tiles");

        let mut products = Vec::new();
        for tile in &tiles {
            match self.scrape_tile(&fetcher, tile).await {
                Ok(product) => products.push(product),
                Err(e) => warn!(tile_id = %tile.raw_id, error = %e, "Skipping product tile"),
            }
        }

        let path = json_file::write_products(&products, &self.cfg.html_output_filename)?;
        info!(
            products = products.len(),
            requests = fetcher.requests_sent(),
            output = %path.display(),
            "Html pipeline finished"
        );
        Ok(())
    }

    async fn scrape_tile(
        &self,
        fetcher: &Fetcher,
        tile: &ProductTile,
    ) -> Result<Product, ScrapeError> {
        let detail_url = Url::parse(&self.cfg.html_url)
            .and_then(|base| base.join(&tile.href))
            .map_err(|_| ScrapeError::MalformedField {
                field: "href",
                value: tile.href.clone(),
            })?;

        let html = fetcher.fetch(detail_url.as_str(), &self.policy, false).await?;
        let detail = parser::extract_detail(&html)?;

        let id: i64 = tile
            .raw_id
            .parse()
            .map_err(|_| ScrapeError::MalformedField {
                field: "id",
                value: tile.raw_id.clone(),
            })?;

        Ok(Product {
            id,
            product_name: detail.product_name,
            brand_name: tile.brand_name.clone(),
            colors: detail.colors,
            price: detail.price,
        })
    }

    pub async fn run_api_pipeline(&self) -> anyhow::Result<()> {
        info!("Starting API pipeline");

        let fetcher = Fetcher::new(&self.cfg.api_user_agent, self.proxies.clone());
        let body = fetcher
            .fetch(&self.cfg.api_url, &self.policy, self.cfg.use_proxy)
            .await?;
        let document: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ScrapeError::MalformedField {
                field: "document",
                value: e.to_string(),
            })?;

        let mut products = Vec::new();
        let mut skipped = 0usize;
        for entity in api::entities(&document)? {
            match api::parse_entity(entity) {
                Ok(product) => products.push(product),
                Err(e) => {
                    skipped += 1;
                    warn!(error = %e, "Skipping search entity");
                }
            }
        }

        let path = json_file::write_products(&products, &self.cfg.api_output_filename)?;
        info!(
            products = products.len(),
            skipped,
            requests = fetcher.requests_sent(),
            output = %path.display(),
            "API pipeline finished"
        );
        Ok(())
    }
}
