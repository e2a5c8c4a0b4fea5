//! Reference-entity extraction and upsert
//!
//! One pass over the fetched batch collects the unique category, platform,
//! developer and publisher names; a second pass ensures each exists in the
//! store exactly once.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::StoreError;
use crate::models::{NewReference, Product, ReferenceKind};
use crate::store::EntityStore;
use crate::utils::slugify;

use super::KeyedLocks;

/// The unique reference names of one batch, per kind.
#[derive(Debug, Default)]
pub struct ReferenceNames {
    pub categories: HashSet<String>,
    pub platforms: HashSet<String>,
    pub developers: HashSet<String>,
    pub publishers: HashSet<String>,
}

impl ReferenceNames {
    fn of_kind(&self, kind: ReferenceKind) -> &HashSet<String> {
        match kind {
            ReferenceKind::Category => &self.categories,
            ReferenceKind::Platform => &self.platforms,
            ReferenceKind::Developer => &self.developers,
            ReferenceKind::Publisher => &self.publishers,
        }
    }

    /// Iterate every (kind, name) pair in the batch.
    pub fn iter(&self) -> impl Iterator<Item = (ReferenceKind, &str)> {
        ReferenceKind::ALL.iter().flat_map(move |kind| {
            self.of_kind(*kind)
                .iter()
                .map(move |name| (*kind, name.as_str()))
        })
    }

    pub fn total(&self) -> usize {
        self.categories.len() + self.platforms.len() + self.developers.len()
            + self.publishers.len()
    }
}

/// Collect the unique reference names across the whole batch.
///
/// Names are compared by exact string equality; no trimming or case
/// normalization happens here.
pub fn extract_reference_names(products: &[Product]) -> ReferenceNames {
    let mut names = ReferenceNames::default();

    for product in products {
        for genre in &product.genres {
            names.categories.insert(genre.name.clone());
        }
        for os in &product.operating_systems {
            names.platforms.insert(os.clone());
        }
        for developer in &product.developers {
            names.developers.insert(developer.clone());
        }
        for publisher in &product.publishers {
            names.publishers.insert(publisher.clone());
        }
    }

    names
}

/// Idempotently ensures reference entities exist in the store.
pub struct ReferenceUpserter {
    store: Arc<dyn EntityStore>,
    locks: KeyedLocks,
}

impl ReferenceUpserter {
    pub fn new(store: Arc<dyn EntityStore>, locks: KeyedLocks) -> Self {
        Self { store, locks }
    }

    /// Ensure every name of every kind exists. All upserts run concurrently
    /// with no ordering guarantees between them; a failed upsert is logged
    /// and does not affect the others.
    pub async fn upsert_all(&self, names: &ReferenceNames) {
        let results = join_all(
            names
                .iter()
                .map(|(kind, name)| self.ensure_reference(kind, name)),
        )
        .await;

        let mut created = 0usize;
        let mut existing = 0usize;
        for result in results.into_iter().flatten() {
            if result {
                created += 1;
            } else {
                existing += 1;
            }
        }
        info!(
            "Reference upsert complete: {} created, {} existing",
            created, existing
        );
    }

    /// Find-or-create one reference entity. Returns whether it was created.
    async fn ensure_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<bool, StoreError> {
        // Serialize lookup-then-create per (kind, name); the store offers
        // no atomic upsert
        let _guard = self.locks.acquire(&format!("{}:{}", kind, name)).await;

        let result = self.lookup_and_create(kind, name).await;
        if let Err(e) = &result {
            warn!("Reference upsert failed for {} '{}': {}", kind, name, e);
        }
        result
    }

    async fn lookup_and_create(
        &self,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<bool, StoreError> {
        if self.store.find_reference(kind, name).await?.is_some() {
            return Ok(false);
        }

        self.store
            .create_reference(
                kind,
                NewReference {
                    name: name.to_string(),
                    slug: slugify(name),
                },
            )
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Genre, Product};

    fn product(title: &str, genres: &[&str], developers: &[&str]) -> Product {
        Product {
            title: title.to_string(),
            slug: slugify(title),
            price: None,
            release_date: None,
            genres: genres
                .iter()
                .map(|name| Genre {
                    name: name.to_string(),
                })
                .collect(),
            operating_systems: vec!["windows".to_string()],
            developers: developers.iter().map(|d| d.to_string()).collect(),
            publishers: vec![],
            cover_horizontal: None,
            screenshots: vec![],
        }
    }

    #[test]
    fn test_extract_collapses_duplicates_across_products() {
        let products = vec![
            product("One", &["Action"], &["Shared Studio"]),
            product("Two", &["Action", "Indie"], &["Shared Studio"]),
        ];

        let names = extract_reference_names(&products);
        assert_eq!(names.categories.len(), 2);
        assert_eq!(names.developers.len(), 1);
        assert_eq!(names.platforms.len(), 1);
        assert!(names.publishers.is_empty());
    }

    #[test]
    fn test_extract_is_case_sensitive() {
        let products = vec![
            product("One", &[], &["Studio"]),
            product("Two", &[], &["studio"]),
        ];

        // Exact string equality: differing case means two entities
        let names = extract_reference_names(&products);
        assert_eq!(names.developers.len(), 2);
    }

    #[test]
    fn test_iter_covers_all_kinds() {
        let products = vec![product("One", &["Action"], &["Studio"])];
        let names = extract_reference_names(&products);
        assert_eq!(names.iter().count(), names.total());
        assert_eq!(names.total(), 3);
    }
}
