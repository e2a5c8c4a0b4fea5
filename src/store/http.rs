//! HTTP implementations of the store contracts
//!
//! Speaks the content store's REST API: entity collections under
//! `/api/<plural>` with a `{"data": …}` envelope and name filtering via
//! `filters[name][$eq]`, plus the multipart `/api/upload` endpoint for
//! media attachments.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::errors::StoreError;
use crate::models::{GameDraft, GameRecord, NewReference, ReferenceEntity, ReferenceKind};
use crate::store::{AssetField, AssetStore, EntityStore};

/// Entity reference the store uses to link uploads to their owning game.
const GAME_ENTITY_REF: &str = "api::game.game";

const GAMES_COLLECTION: &str = "games";

fn collection(kind: ReferenceKind) -> &'static str {
    match kind {
        ReferenceKind::Category => "categories",
        ReferenceKind::Platform => "platforms",
        ReferenceKind::Developer => "developers",
        ReferenceKind::Publisher => "publishers",
    }
}

#[derive(Debug, Deserialize)]
struct DocumentEnvelope {
    data: Document,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    id: i64,
    #[serde(default)]
    attributes: DocumentAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentAttributes {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    slug: Option<String>,
}

impl Document {
    fn into_reference(self, requested_name: &str) -> ReferenceEntity {
        ReferenceEntity {
            id: self.id,
            name: self.attributes.name.unwrap_or_else(|| requested_name.to_string()),
            slug: self.attributes.slug.unwrap_or_default(),
        }
    }

    fn into_game(self, requested_name: &str, slug: &str) -> GameRecord {
        GameRecord {
            id: self.id,
            name: self.attributes.name.unwrap_or_else(|| requested_name.to_string()),
            slug: self.attributes.slug.unwrap_or_else(|| slug.to_string()),
        }
    }
}

/// HTTP client for the content store's entity collections.
pub struct HttpEntityStore {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpEntityStore {
    pub fn new(base_url: String, api_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_token,
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn find_by_name(
        &self,
        plural: &str,
        name: &str,
    ) -> Result<Option<Document>, StoreError> {
        let url = format!("{}/api/{}", self.base_url, plural);
        let response = self
            .authorize(self.client.get(&url))
            .query(&[("filters[name][$eq]", name)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::status(status.as_u16(), format!("find {plural}")));
        }

        let envelope: ListEnvelope = response.json().await?;
        Ok(envelope.data.into_iter().next())
    }

    async fn create_document(
        &self,
        plural: &str,
        data: serde_json::Value,
    ) -> Result<Document, StoreError> {
        let url = format!("{}/api/{}", self.base_url, plural);
        let response = self
            .authorize(self.client.post(&url))
            .json(&json!({ "data": data }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::status(status.as_u16(), format!("create {plural}")));
        }

        let envelope: DocumentEnvelope = response.json().await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl EntityStore for HttpEntityStore {
    async fn find_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<Option<ReferenceEntity>, StoreError> {
        let document = self.find_by_name(collection(kind), name).await?;
        Ok(document.map(|d| d.into_reference(name)))
    }

    async fn create_reference(
        &self,
        kind: ReferenceKind,
        entity: NewReference,
    ) -> Result<ReferenceEntity, StoreError> {
        debug!("Creating {} entity: {}", kind, entity.name);
        let document = self
            .create_document(
                collection(kind),
                json!({ "name": entity.name, "slug": entity.slug }),
            )
            .await?;
        Ok(document.into_reference(&entity.name))
    }

    async fn find_game(&self, name: &str) -> Result<Option<GameRecord>, StoreError> {
        let document = self.find_by_name(GAMES_COLLECTION, name).await?;
        Ok(document.map(|d| d.into_game(name, "")))
    }

    async fn create_game(&self, draft: GameDraft) -> Result<GameRecord, StoreError> {
        // The store's game schema names the publisher relation in the singular
        let data = json!({
            "name": draft.name,
            "slug": draft.slug,
            "price": draft.price,
            "release_date": draft.release_date,
            "categories": draft.categories,
            "platforms": draft.platforms,
            "developers": draft.developers,
            "publisher": draft.publishers,
            "description": draft.info.description,
            "short_description": draft.info.short_description,
            "rating": draft.info.rating,
            "publishedAt": draft.published_at,
        });

        let document = self.create_document(GAMES_COLLECTION, data).await?;
        Ok(document.into_game(&draft.name, &draft.slug))
    }
}

/// HTTP client for the content store's multipart upload endpoint.
pub struct HttpAssetStore {
    client: Client,
    upload_url: String,
    api_token: Option<String>,
}

impl HttpAssetStore {
    pub fn new(base_url: String, api_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            upload_url: format!("{}/api/upload", base_url),
            api_token,
        }
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn upload(
        &self,
        game: &GameRecord,
        field: AssetField,
        filename: &str,
        data: Bytes,
    ) -> Result<(), StoreError> {
        let part = multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str("image/jpeg")?;

        let form = multipart::Form::new()
            .text("refId", game.id.to_string())
            .text("ref", GAME_ENTITY_REF)
            .text("field", field.as_str())
            .part("files", part);

        let mut request = self.client.post(&self.upload_url).multipart(form);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Upload {
                filename: filename.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        Ok(())
    }
}
