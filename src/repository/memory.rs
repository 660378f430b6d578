//! In-memory document store for tests, local runs and demos

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::{cmp::Ordering, collections::HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DocumentStore, Filter, Query};
use crate::error::StoreResult;

type Collection = IndexMap<Uuid, Value>;

/// Collections kept in insertion order behind a single lock
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<&'static str, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(doc: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { field, value } => doc.get(field) == Some(value),
        Filter::Contains { field, value } => doc
            .get(field)
            .and_then(Value::as_array)
            .is_some_and(|items| items.contains(value)),
        Filter::EqIgnoreCase { field, value } => doc
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase() == value.to_lowercase()),
        Filter::AnyOf { field, values } => doc
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| values.iter().any(|v| v == s)),
    }
}

fn matches_all(doc: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| matches(doc, f))
}

/// Missing and null sort first, then numbers, then strings
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or_default(), y.as_f64().unwrap_or_default());
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &'static str, id: Uuid, doc: Value) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().insert(id, doc);
        Ok(())
    }

    async fn get(&self, collection: &'static str, id: Uuid) -> StoreResult<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| c.get(&id)).cloned())
    }

    async fn find(&self, collection: &'static str, query: &Query) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Value> = collections
            .get(collection)
            .map(|c| {
                c.values()
                    .filter(|doc| matches_all(doc, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(field) = query.sort {
            // stable: equal keys keep insertion order
            docs.sort_by(|a, b| compare_field(a.get(field), b.get(field)));
        }
        Ok(docs)
    }

    async fn replace(&self, collection: &'static str, id: Uuid, doc: Value) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        match collections.get_mut(collection).and_then(|c| c.get_mut(&id)) {
            Some(existing) => {
                *existing = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, collection: &'static str, id: Uuid) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|c| c.shift_remove(&id))
            .is_some())
    }

    async fn count(&self, collection: &'static str, filters: &[Filter]) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|c| c.values().filter(|doc| matches_all(doc, filters)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }
}
