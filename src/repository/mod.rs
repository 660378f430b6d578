//! Repository layer for catalog persistence
//!
//! Entities are stored as JSON documents through a [`DocumentStore`]
//! backend. [`Repository`] is the typed facade the services use.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::{error::StoreResult, models::Entity};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A condition on one document field
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the value
    Eq { field: &'static str, value: Value },
    /// Array field contains the value
    Contains { field: &'static str, value: Value },
    /// String field equals the value ignoring case
    EqIgnoreCase { field: &'static str, value: String },
    /// String field is one of the values
    AnyOf { field: &'static str, values: Vec<String> },
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Eq { field, value: value.into() }
    }

    /// Documents whose `field` holds this id
    pub fn references(field: &'static str, id: Uuid) -> Self {
        Filter::Eq { field, value: Value::String(id.to_string()) }
    }

    /// Documents whose `field` array includes this id
    pub fn contains_ref(field: &'static str, id: Uuid) -> Self {
        Filter::Contains { field, value: Value::String(id.to_string()) }
    }

    pub fn eq_ignore_case(field: &'static str, value: impl Into<String>) -> Self {
        Filter::EqIgnoreCase { field, value: value.into() }
    }

    pub fn ids(ids: &[Uuid]) -> Self {
        Filter::AnyOf {
            field: "id",
            values: ids.iter().map(Uuid::to_string).collect(),
        }
    }
}

/// Filters (all must match) and an optional ascending sort key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub sort: Option<&'static str>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort_by(mut self, field: &'static str) -> Self {
        self.sort = Some(field);
        self
    }
}

/// Id-keyed JSON document storage grouped in named collections.
///
/// Lookups of absent ids return `None` / `false`, never an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &'static str, id: Uuid, doc: Value) -> StoreResult<()>;

    async fn get(&self, collection: &'static str, id: Uuid) -> StoreResult<Option<Value>>;

    /// Matching documents, ascending by `query.sort` if set, insertion order otherwise.
    ///
    /// Sort keys are strings compared by code point (`"Zed"` before `"adams"`);
    /// documents without the key come first, and ties keep insertion order.
    async fn find(&self, collection: &'static str, query: &Query) -> StoreResult<Vec<Value>>;

    /// Replace an existing document; `false` when the id is absent
    async fn replace(&self, collection: &'static str, id: Uuid, doc: Value) -> StoreResult<bool>;

    /// `false` when the id is absent
    async fn remove(&self, collection: &'static str, id: Uuid) -> StoreResult<bool>;

    async fn count(&self, collection: &'static str, filters: &[Filter]) -> StoreResult<u64>;
}

/// Typed access to catalog entities
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Repository over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persist a draft under a newly minted id
    pub async fn create<E: Entity>(&self, draft: E::Draft) -> StoreResult<E> {
        let entity = E::from_draft(Uuid::new_v4(), draft);
        let doc = serde_json::to_value(&entity)?;
        self.store.insert(E::COLLECTION, entity.id(), doc).await?;
        Ok(entity)
    }

    pub async fn get<E: Entity>(&self, id: Uuid) -> StoreResult<Option<E>> {
        match self.store.get(E::COLLECTION, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Matching entities in the query's order
    pub async fn find_all<E: Entity>(&self, query: Query) -> StoreResult<Vec<E>> {
        self.store
            .find(E::COLLECTION, &query)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(Into::into))
            .collect()
    }

    /// Replace the fields of an existing entity; `None` when absent
    pub async fn update<E: Entity>(&self, id: Uuid, draft: E::Draft) -> StoreResult<Option<E>> {
        let entity = E::from_draft(id, draft);
        let doc = serde_json::to_value(&entity)?;
        if self.store.replace(E::COLLECTION, id, doc).await? {
            Ok(Some(entity))
        } else {
            Ok(None)
        }
    }

    /// `false` when there was nothing to delete
    pub async fn delete<E: Entity>(&self, id: Uuid) -> StoreResult<bool> {
        self.store.remove(E::COLLECTION, id).await
    }

    pub async fn count<E: Entity>(&self, filters: &[Filter]) -> StoreResult<u64> {
        self.store.count(E::COLLECTION, filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Genre, GenreDraft};

    fn genre(name: &str) -> GenreDraft {
        GenreDraft { name: name.into() }
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let repo = Repository::in_memory();
        let created: Genre = repo.create(genre("Poetry")).await.unwrap();

        let fetched = repo.get::<Genre>(created.id).await.unwrap();
        assert_eq!(fetched, Some(created.clone()));

        let updated = repo.update::<Genre>(created.id, genre("Verse")).await.unwrap();
        assert_eq!(updated.map(|g| g.name), Some("Verse".to_string()));

        assert!(repo.delete::<Genre>(created.id).await.unwrap());
        assert!(!repo.delete::<Genre>(created.id).await.unwrap());
        assert_eq!(repo.get::<Genre>(created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_errors() {
        let repo = Repository::in_memory();
        let id = Uuid::new_v4();
        assert_eq!(repo.get::<Genre>(id).await.unwrap(), None);
        assert_eq!(repo.update::<Genre>(id, genre("Drama")).await.unwrap(), None);
        assert!(!repo.delete::<Genre>(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_all_sorted() {
        let repo = Repository::in_memory();
        for name in ["Romance", "Fantasy", "Horror"] {
            repo.create::<Genre>(genre(name)).await.unwrap();
        }
        let names: Vec<_> = repo
            .find_all::<Genre>(Query::all().sort_by("name"))
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["Fantasy", "Horror", "Romance"]);
        assert_eq!(repo.count::<Genre>(&[]).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_finds_with_inline_queries() {
        let repo = Repository::in_memory();
        let drama: Genre = repo.create(genre("Drama")).await.unwrap();
        repo.create::<Genre>(genre("Comedy")).await.unwrap();

        let (sorted, matching) = tokio::try_join!(
            repo.find_all::<Genre>(Query::all().sort_by("name")),
            repo.find_all::<Genre>(Query::all().filter(Filter::ids(&[drama.id]))),
        )
        .unwrap();
        assert_eq!(sorted[0].name, "Comedy");
        assert_eq!(matching, vec![drama]);
    }
}
