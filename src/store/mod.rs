//! Content store collaborators
//!
//! The pipeline persists nothing locally; reference entities, games and
//! media all live in an external content store. Two narrow contracts cover
//! everything the pipeline needs: find/create per entity kind on the
//! [`EntityStore`], and append-only binary attachment on the
//! [`AssetStore`]. No update or delete operation exists on either.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

use crate::errors::StoreError;
use crate::models::{GameDraft, GameRecord, NewReference, ReferenceEntity, ReferenceKind};

pub mod http;

pub use http::{HttpAssetStore, HttpEntityStore};

/// Entity persistence contract: find-by-exact-name and create, per kind.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<Option<ReferenceEntity>, StoreError>;

    async fn create_reference(
        &self,
        kind: ReferenceKind,
        entity: NewReference,
    ) -> Result<ReferenceEntity, StoreError>;

    async fn find_game(&self, name: &str) -> Result<Option<GameRecord>, StoreError>;

    async fn create_game(&self, draft: GameDraft) -> Result<GameRecord, StoreError>;
}

/// Binary upload contract: attach a named file to a field of a game.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload(
        &self,
        game: &GameRecord,
        field: AssetField,
        filename: &str,
        data: Bytes,
    ) -> Result<(), StoreError>;
}

/// Target field of an uploaded image on the game entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetField {
    Cover,
    Gallery,
}

impl AssetField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetField::Cover => "cover",
            AssetField::Gallery => "gallery",
        }
    }
}

impl fmt::Display for AssetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
