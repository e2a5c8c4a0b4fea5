//! Upstream catalog access
//!
//! The catalog endpoint returns a JSON body with a `products` array; query
//! parameters supplied by the trigger are forwarded verbatim. A fetch or
//! decode failure here is batch-fatal: nothing has been persisted yet, so
//! the whole run aborts.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::errors::CatalogError;
use crate::models::Product;

/// Source of raw product records for one synchronization run.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, params: &HashMap<String, String>)
        -> Result<Vec<Product>, CatalogError>;
}

/// HTTP client for the upstream catalog API.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<Vec<Product>, CatalogError> {
        debug!("Fetching catalog from {} with {} parameters", self.base_url, params.len());

        let response = self.client.get(&self.base_url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: self.base_url.clone(),
            });
        }

        let body = response.bytes().await?;
        let payload: CatalogResponse = serde_json::from_slice(&body)
            .map_err(|e| CatalogError::decode(e.to_string()))?;

        info!("Fetched {} products from catalog", payload.products.len());
        Ok(payload.products)
    }
}
