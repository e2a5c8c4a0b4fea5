//! Media download and upload
//!
//! Downloads each game's cover and a capped number of gallery screenshots
//! from the upstream CDN and attaches them to the game in the asset store.
//! Every upload is individually best-effort.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::{AppError, CatalogError};
use crate::models::{GameRecord, Product};
use crate::store::{AssetField, AssetStore};

/// Server-side template placeholder in upstream screenshot URLs.
const FORMATTER_TOKEN: &str = "{formatter}";

/// Source of raw image bytes.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn download(&self, url: &str) -> Result<Bytes, CatalogError>;
}

/// Plain HTTP image download.
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn download(&self, url: &str) -> Result<Bytes, CatalogError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?)
    }
}

pub struct AssetUploader {
    store: Arc<dyn AssetStore>,
    images: Arc<dyn ImageSource>,
    gallery_limit: usize,
    screenshot_format: String,
}

impl AssetUploader {
    pub fn new(
        store: Arc<dyn AssetStore>,
        images: Arc<dyn ImageSource>,
        gallery_limit: usize,
        screenshot_format: String,
    ) -> Self {
        Self {
            store,
            images,
            gallery_limit,
            screenshot_format,
        }
    }

    /// Upload the cover image, then the first screenshots up to the gallery
    /// cap, with the template placeholder substituted. A failed upload is
    /// logged and skipped; the remaining uploads still run.
    pub async fn upload_game_media(&self, product: &Product, game: &GameRecord) {
        if let Some(cover_url) = &product.cover_horizontal {
            self.upload_image(cover_url, game, AssetField::Cover).await;
        }

        let gallery_urls: Vec<String> = product
            .screenshots
            .iter()
            .take(self.gallery_limit)
            .map(|url| url.replace(FORMATTER_TOKEN, &self.screenshot_format))
            .collect();

        join_all(
            gallery_urls
                .iter()
                .map(|url| self.upload_image(url, game, AssetField::Gallery)),
        )
        .await;
    }

    async fn upload_image(&self, url: &str, game: &GameRecord, field: AssetField) {
        let filename = format!("{}.jpg", game.slug);
        info!("Uploading {} image: {}", field, filename);

        if let Err(e) = self.try_upload(url, game, field, &filename).await {
            warn!("{} upload failed for game '{}': {}", field, game.name, e);
        }
    }

    async fn try_upload(
        &self,
        url: &str,
        game: &GameRecord,
        field: AssetField,
        filename: &str,
    ) -> Result<(), AppError> {
        let data = self.images.download(url).await?;
        self.store.upload(game, field, filename, data).await?;
        Ok(())
    }
}
