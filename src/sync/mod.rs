//! Catalog synchronization pipeline
//!
//! Orchestrates one run end to end: fetch the catalog, upsert the
//! deduplicated reference entities once for the whole batch, then process
//! every product in parallel (skip-existing check, relation resolution,
//! detail enrichment, game creation, media upload). A failure inside one
//! product's flow is caught and recorded without touching its siblings;
//! only a catalog fetch/decode failure aborts the run.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::catalog::CatalogSource;
use crate::config::SyncConfig;
use crate::enrich::Enricher;
use crate::errors::{AppError, CatalogError};
use crate::models::{ItemFailure, Product, SyncSummary};
use crate::store::{AssetStore, EntityStore};

pub mod assets;
pub mod games;
pub mod references;

pub use assets::{AssetUploader, HttpImageSource, ImageSource};
pub use games::{GameUpserter, UpsertOutcome};
pub use references::{extract_reference_names, ReferenceNames, ReferenceUpserter};

/// Pipeline tunables, kept explicit so runs can be made deterministic.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Maximum gallery screenshots imported per game.
    pub gallery_limit: usize,
    /// Image-size token substituted into templated screenshot URLs.
    pub screenshot_format: String,
    /// Fixed publish timestamp; `None` publishes at creation time.
    pub publish_at: Option<DateTime<Utc>>,
}

impl From<&SyncConfig> for SyncSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            gallery_limit: config.gallery_limit,
            screenshot_format: config.screenshot_format.clone(),
            publish_at: config.publish_at,
        }
    }
}

/// Pipeline stages used to label per-item failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Lookup,
    Relations,
    Create,
}

impl SyncStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStage::Lookup => "lookup",
            SyncStage::Relations => "relations",
            SyncStage::Create => "create",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item-recoverable failure tagged with the stage it originated from.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: SyncStage,
    #[source]
    pub source: AppError,
}

impl StageError {
    pub fn new<E: Into<AppError>>(stage: SyncStage, source: E) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// Key-partitioned async locks.
///
/// The store's lookup-then-create sequence is not atomic; holding the key's
/// lock across both halves keeps concurrent runs in this process from
/// creating the same logical entity twice. Entries are never evicted; the
/// key space is bounded by the set of unique entity names seen.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let cell = {
            let mut map = self.inner.lock().await;
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        cell.lock_owned().await
    }
}

enum ItemOutcome {
    Created,
    Skipped,
    Failed(ItemFailure),
}

/// The pipeline orchestrator.
pub struct SyncService {
    catalog: Arc<dyn CatalogSource>,
    references: ReferenceUpserter,
    games: GameUpserter,
    assets: AssetUploader,
}

impl SyncService {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        entity_store: Arc<dyn EntityStore>,
        asset_store: Arc<dyn AssetStore>,
        enricher: Arc<dyn Enricher>,
        images: Arc<dyn ImageSource>,
        settings: SyncSettings,
    ) -> Self {
        let locks = KeyedLocks::new();
        Self {
            catalog,
            references: ReferenceUpserter::new(entity_store.clone(), locks.clone()),
            games: GameUpserter::new(entity_store, enricher, locks, settings.publish_at),
            assets: AssetUploader::new(
                asset_store,
                images,
                settings.gallery_limit,
                settings.screenshot_format,
            ),
        }
    }

    /// Fetch the catalog with the supplied query parameters and synchronize
    /// it. A fetch or decode error aborts the run before any write.
    pub async fn populate(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<SyncSummary, CatalogError> {
        let products = self.catalog.fetch(params).await?;
        Ok(self.run(&products).await)
    }

    /// Synchronize an already-fetched batch: one reference pass for the
    /// whole batch, then every product in parallel, each fault-isolated.
    pub async fn run(&self, products: &[Product]) -> SyncSummary {
        let run_id = Uuid::new_v4();
        info!("Starting catalog sync {}: {} products", run_id, products.len());

        let names = references::extract_reference_names(products);
        debug!("Batch carries {} unique reference names", names.total());
        self.references.upsert_all(&names).await;

        let outcomes = join_all(products.iter().map(|p| self.process_product(p))).await;

        let mut summary = SyncSummary {
            run_id,
            total: products.len(),
            created: 0,
            skipped: 0,
            failures: Vec::new(),
        };
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Created => summary.created += 1,
                ItemOutcome::Skipped => summary.skipped += 1,
                ItemOutcome::Failed(failure) => summary.failures.push(failure),
            }
        }

        info!(
            "Catalog sync {} finished: {} created, {} skipped, {} failed",
            run_id,
            summary.created,
            summary.skipped,
            summary.failed()
        );
        summary
    }

    async fn process_product(&self, product: &Product) -> ItemOutcome {
        match self.games.upsert(product).await {
            Ok(UpsertOutcome::Skipped) => ItemOutcome::Skipped,
            Ok(UpsertOutcome::Created(game)) => {
                self.assets.upload_game_media(product, &game).await;
                ItemOutcome::Created
            }
            Err(e) => {
                error!(
                    "Product '{}' failed at stage {}: {}",
                    product.title, e.stage, e.source
                );
                ItemOutcome::Failed(ItemFailure {
                    title: product.title.clone(),
                    stage: e.stage.as_str().to_string(),
                    message: e.source.to_string(),
                })
            }
        }
    }
}
