use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Raw product record as returned by the upstream catalog API.
///
/// Field names follow the upstream JSON shape; unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub price: Option<ProductPrice>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub operating_systems: Vec<String>,
    #[serde(default)]
    pub developers: Vec<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
    #[serde(default)]
    pub cover_horizontal: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPrice {
    pub final_money: Money,
}

/// Upstream serializes decimal amounts as strings; they are passed through
/// verbatim to the store rather than re-parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Money {
    pub amount: String,
    #[serde(default)]
    pub currency: Option<String>,
}

/// The four deduplicated lookup-entity kinds referenced by games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Category,
    Platform,
    Developer,
    Publisher,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 4] = [
        ReferenceKind::Category,
        ReferenceKind::Platform,
        ReferenceKind::Developer,
        ReferenceKind::Publisher,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Category => "category",
            ReferenceKind::Platform => "platform",
            ReferenceKind::Developer => "developer",
            ReferenceKind::Publisher => "publisher",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference entity as persisted in the store. Created once per unique
/// name, never updated or deleted by this pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Payload for creating a reference entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReference {
    pub name: String,
    pub slug: String,
}

/// Metadata scraped from a game's detail page.
///
/// An empty value (all `None`) is the degraded result when the detail page
/// could not be fetched or parsed; the game is still created without it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameInfo {
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub rating: Option<String>,
}

/// Everything needed to create a game entity in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDraft {
    pub name: String,
    /// Slug as supplied by upstream, not re-derived.
    pub slug: String,
    pub price: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub categories: Vec<i64>,
    pub platforms: Vec<i64>,
    pub developers: Vec<i64>,
    pub publishers: Vec<i64>,
    pub info: GameInfo,
    pub published_at: DateTime<Utc>,
}

/// A game entity as persisted in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Aggregate result of one synchronization run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub run_id: Uuid,
    pub total: usize,
    pub created: usize,
    pub skipped: usize,
    pub failures: Vec<ItemFailure>,
}

impl SyncSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// One product that could not be processed, with the stage it failed at.
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub title: String,
    pub stage: String,
    pub message: String,
}
