//! Per-product game upsert
//!
//! The game name is the idempotency key: a product whose title already
//! exists in the store is skipped outright, with no enrichment, relation
//! resolution or media upload. New games get their reference relations
//! resolved, their detail-page metadata attached and a publish timestamp.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::enrich::Enricher;
use crate::errors::StoreError;
use crate::models::{GameDraft, GameRecord, Product, ReferenceKind};
use crate::store::EntityStore;

use super::{KeyedLocks, StageError, SyncStage};

/// Result of one per-product upsert.
pub enum UpsertOutcome {
    Created(GameRecord),
    Skipped,
}

pub struct GameUpserter {
    store: Arc<dyn EntityStore>,
    enricher: Arc<dyn Enricher>,
    locks: KeyedLocks,
    publish_at: Option<DateTime<Utc>>,
}

struct Relations {
    categories: Vec<i64>,
    platforms: Vec<i64>,
    developers: Vec<i64>,
    publishers: Vec<i64>,
}

impl GameUpserter {
    pub fn new(
        store: Arc<dyn EntityStore>,
        enricher: Arc<dyn Enricher>,
        locks: KeyedLocks,
        publish_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            store,
            enricher,
            locks,
            publish_at,
        }
    }

    /// Create the game for this product unless one with the same name
    /// already exists.
    pub async fn upsert(&self, product: &Product) -> Result<UpsertOutcome, StageError> {
        let _guard = self
            .locks
            .acquire(&format!("game:{}", product.title))
            .await;

        let existing = self
            .store
            .find_game(&product.title)
            .await
            .map_err(|e| StageError::new(SyncStage::Lookup, e))?;
        if existing.is_some() {
            debug!("Game '{}' already exists, skipping", product.title);
            return Ok(UpsertOutcome::Skipped);
        }

        info!("Creating game: {}", product.title);

        let relations = self
            .resolve_relations(product)
            .await
            .map_err(|e| StageError::new(SyncStage::Relations, e))?;

        let info = self.enricher.enrich(&product.slug).await;

        let draft = GameDraft {
            name: product.title.clone(),
            slug: product.slug.clone(),
            price: product
                .price
                .as_ref()
                .map(|price| price.final_money.amount.clone()),
            release_date: product
                .release_date
                .as_deref()
                .and_then(|raw| parse_release_date(raw, &product.title)),
            categories: relations.categories,
            platforms: relations.platforms,
            developers: relations.developers,
            publishers: relations.publishers,
            info,
            published_at: self.publish_at.unwrap_or_else(Utc::now),
        };

        let game = self
            .store
            .create_game(draft)
            .await
            .map_err(|e| StageError::new(SyncStage::Create, e))?;
        Ok(UpsertOutcome::Created(game))
    }

    async fn resolve_relations(&self, product: &Product) -> Result<Relations, StoreError> {
        Ok(Relations {
            categories: self
                .resolve_kind(
                    ReferenceKind::Category,
                    product.genres.iter().map(|genre| genre.name.as_str()),
                    &product.title,
                )
                .await?,
            platforms: self
                .resolve_kind(
                    ReferenceKind::Platform,
                    product.operating_systems.iter().map(String::as_str),
                    &product.title,
                )
                .await?,
            developers: self
                .resolve_kind(
                    ReferenceKind::Developer,
                    product.developers.iter().map(String::as_str),
                    &product.title,
                )
                .await?,
            publishers: self
                .resolve_kind(
                    ReferenceKind::Publisher,
                    product.publishers.iter().map(String::as_str),
                    &product.title,
                )
                .await?,
        })
    }

    /// Resolve listed names to entity ids. A missing entity is a data
    /// inconsistency (the reference pass should have created it); the
    /// relation is omitted rather than failing the product.
    async fn resolve_kind<'a, I>(
        &self,
        kind: ReferenceKind,
        names: I,
        game: &str,
    ) -> Result<Vec<i64>, StoreError>
    where
        I: Iterator<Item = &'a str>,
    {
        let mut ids = Vec::new();
        for name in names {
            match self.store.find_reference(kind, name).await? {
                Some(entity) => ids.push(entity.id),
                None => warn!("Missing {} entity '{}' for game '{}'", kind, name, game),
            }
        }
        Ok(ids)
    }
}

fn parse_release_date(raw: &str, title: &str) -> Option<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y.%m.%d"));
    match parsed {
        Ok(date) => Some(date),
        Err(_) => {
            warn!("Unparseable release date '{}' for game '{}'", raw, title);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_date_formats() {
        assert_eq!(
            parse_release_date("2023-05-11", "t"),
            NaiveDate::from_ymd_opt(2023, 5, 11)
        );
        assert_eq!(
            parse_release_date("2023.05.11", "t"),
            NaiveDate::from_ymd_opt(2023, 5, 11)
        );
    }

    #[test]
    fn test_parse_release_date_degrades_to_none() {
        assert_eq!(parse_release_date("soon", "t"), None);
        assert_eq!(parse_release_date("", "t"), None);
    }
}
