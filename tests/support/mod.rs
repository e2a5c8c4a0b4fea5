//! In-memory collaborator implementations for pipeline tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;

use catalog_sync::catalog::CatalogSource;
use catalog_sync::enrich::{parse_game_info, Enricher};
use catalog_sync::errors::{CatalogError, StoreError};
use catalog_sync::models::{
    GameDraft, GameInfo, GameRecord, Genre, Money, NewReference, Product, ProductPrice,
    ReferenceEntity, ReferenceKind,
};
use catalog_sync::store::{AssetField, AssetStore, EntityStore};
use catalog_sync::sync::ImageSource;
use catalog_sync::utils::slugify;

/// Entity store over plain vectors, with exact-name lookup semantics.
#[derive(Default)]
pub struct InMemoryEntityStore {
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    next_id: i64,
    references: Vec<(ReferenceKind, ReferenceEntity)>,
    games: Vec<(GameRecord, Option<GameDraft>)>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference_count(&self, kind: ReferenceKind) -> usize {
        self.state
            .lock()
            .unwrap()
            .references
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn game_count(&self) -> usize {
        self.state.lock().unwrap().games.len()
    }

    pub fn game_draft(&self, name: &str) -> Option<GameDraft> {
        self.state
            .lock()
            .unwrap()
            .games
            .iter()
            .find(|(record, _)| record.name == name)
            .and_then(|(_, draft)| draft.clone())
    }

    /// Pre-populate a game, as if created by an earlier run.
    pub fn seed_game(&self, name: &str, slug: &str) -> GameRecord {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let record = GameRecord {
            id: state.next_id,
            name: name.to_string(),
            slug: slug.to_string(),
        };
        state.games.push((record.clone(), None));
        record
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn find_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<Option<ReferenceEntity>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .references
            .iter()
            .find(|(k, entity)| *k == kind && entity.name == name)
            .map(|(_, entity)| entity.clone()))
    }

    async fn create_reference(
        &self,
        kind: ReferenceKind,
        entity: NewReference,
    ) -> Result<ReferenceEntity, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = ReferenceEntity {
            id: state.next_id,
            name: entity.name,
            slug: entity.slug,
        };
        state.references.push((kind, created.clone()));
        Ok(created)
    }

    async fn find_game(&self, name: &str) -> Result<Option<GameRecord>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .games
            .iter()
            .find(|(record, _)| record.name == name)
            .map(|(record, _)| record.clone()))
    }

    async fn create_game(&self, draft: GameDraft) -> Result<GameRecord, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let record = GameRecord {
            id: state.next_id,
            name: draft.name.clone(),
            slug: draft.slug.clone(),
        };
        state.games.push((record.clone(), Some(draft)));
        Ok(record)
    }
}

#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub game_id: i64,
    pub field: String,
    pub filename: String,
}

/// Asset store that records uploads instead of persisting anything.
#[derive(Default)]
pub struct RecordingAssetStore {
    uploads: Mutex<Vec<UploadRecord>>,
}

impl RecordingAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn uploads_for(&self, game_id: i64) -> Vec<UploadRecord> {
        self.uploads()
            .into_iter()
            .filter(|record| record.game_id == game_id)
            .collect()
    }
}

#[async_trait]
impl AssetStore for RecordingAssetStore {
    async fn upload(
        &self,
        game: &GameRecord,
        field: AssetField,
        filename: &str,
        _data: Bytes,
    ) -> Result<(), StoreError> {
        self.uploads.lock().unwrap().push(UploadRecord {
            game_id: game.id,
            field: field.as_str().to_string(),
            filename: filename.to_string(),
        });
        Ok(())
    }
}

/// Image source returning a fixed payload and recording requested URLs.
#[derive(Default)]
pub struct StaticImageSource {
    requested: Mutex<Vec<String>>,
}

impl StaticImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageSource for StaticImageSource {
    async fn download(&self, url: &str) -> Result<Bytes, CatalogError> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(Bytes::from_static(b"\xff\xd8\xffjpeg"))
    }
}

/// Enricher over canned HTML pages, parsed through the real extraction
/// code. A slug without a page degrades to an empty result, exactly like a
/// failed detail fetch.
pub struct PageEnricher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
    default_rating: String,
}

impl PageEnricher {
    pub fn new(default_rating: &str) -> Self {
        Self {
            pages: HashMap::new(),
            requested: Mutex::new(Vec::new()),
            default_rating: default_rating.to_string(),
        }
    }

    pub fn with_page(mut self, slug: &str, html: &str) -> Self {
        self.pages.insert(slug.to_string(), html.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Enricher for PageEnricher {
    async fn enrich(&self, slug: &str) -> GameInfo {
        self.requested.lock().unwrap().push(slug.to_string());
        match self.pages.get(slug) {
            Some(html) => parse_game_info(html, &self.default_rating).unwrap_or_default(),
            None => GameInfo::default(),
        }
    }
}

/// Catalog source serving a fixed product list.
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch(
        &self,
        _params: &HashMap<String, String>,
    ) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.clone())
    }
}

/// Catalog source that always fails, for batch-fatal coverage.
pub struct FailingCatalog;

#[async_trait]
impl CatalogSource for FailingCatalog {
    async fn fetch(
        &self,
        _params: &HashMap<String, String>,
    ) -> Result<Vec<Product>, CatalogError> {
        Err(CatalogError::Status {
            status: 503,
            url: "http://catalog.invalid".to_string(),
        })
    }
}

/// A fully-populated product fixture.
pub fn sample_product(title: &str) -> Product {
    let slug = slugify(title);
    Product {
        title: title.to_string(),
        slug: slug.clone(),
        price: Some(ProductPrice {
            final_money: Money {
                amount: "19.99".to_string(),
                currency: Some("USD".to_string()),
            },
        }),
        release_date: Some("2023-05-11".to_string()),
        genres: vec![Genre {
            name: "Action".to_string(),
        }],
        operating_systems: vec!["windows".to_string()],
        developers: vec!["Neon Forge".to_string()],
        publishers: vec!["Big Box Games".to_string()],
        cover_horizontal: Some(format!("https://images.invalid/{slug}_cover.jpg")),
        screenshots: (1..=2)
            .map(|i| format!("https://images.invalid/{slug}_{i}_{{formatter}}.jpg"))
            .collect(),
    }
}
