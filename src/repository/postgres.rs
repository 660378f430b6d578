//! PostgreSQL document store: one JSONB row per entity

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, Pool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{DocumentStore, Filter, Query};
use crate::{config::StorageConfig, error::StoreResult};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a pool from the storage settings
    pub async fn connect(config: &StorageConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Append `AND ...` clauses; field names are bound, never spliced
fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filters: &'a [Filter]) {
    for filter in filters {
        match filter {
            Filter::Eq { field, value } => {
                builder
                    .push(" AND body -> ")
                    .push_bind(*field)
                    .push(" = ")
                    .push_bind(Json(value));
            }
            Filter::Contains { field, value } => {
                builder
                    .push(" AND body -> ")
                    .push_bind(*field)
                    .push(" @> ")
                    .push_bind(Json(Value::Array(vec![value.clone()])));
            }
            Filter::EqIgnoreCase { field, value } => {
                builder
                    .push(" AND lower(body ->> ")
                    .push_bind(*field)
                    .push(") = lower(")
                    .push_bind(value.as_str())
                    .push(")");
            }
            Filter::AnyOf { field, values } => {
                builder
                    .push(" AND body ->> ")
                    .push_bind(*field)
                    .push(" = ANY(")
                    .push_bind(values.as_slice())
                    .push(")");
            }
        }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert(&self, collection: &'static str, id: Uuid, doc: Value) -> StoreResult<()> {
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Json(doc))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, collection: &'static str, id: Uuid) -> StoreResult<Option<Value>> {
        let row: Option<(Json<Value>,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(Json(body),)| body))
    }

    async fn find(&self, collection: &'static str, query: &Query) -> StoreResult<Vec<Value>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT body FROM documents WHERE collection = ");
        builder.push_bind(collection);
        push_filters(&mut builder, &query.filters);

        builder.push(" ORDER BY ");
        if let Some(field) = query.sort {
            builder
                .push("(body ->> ")
                .push_bind(field)
                .push(") COLLATE \"C\" ASC NULLS FIRST, ");
        }
        builder.push("seq ASC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| -> StoreResult<Value> {
                let Json(body) = row.try_get::<Json<Value>, _>("body")?;
                Ok(body)
            })
            .collect()
    }

    async fn replace(&self, collection: &'static str, id: Uuid, doc: Value) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .bind(Json(doc))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, collection: &'static str, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, collection: &'static str, filters: &[Filter]) -> StoreResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents WHERE collection = ");
        builder.push_bind(collection);
        push_filters(&mut builder, filters);

        let row = builder.build().fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Store over `DATABASE_URL` with `collection` emptied
    async fn store(collection: &'static str) -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
        let store = PgStore::connect(&StorageConfig {
            url,
            ..Default::default()
        })
        .await
        .expect("Failed to connect to database");
        store.migrate().await.expect("Failed to run migrations");
        sqlx::query("DELETE FROM documents WHERE collection = $1")
            .bind(collection)
            .execute(&store.pool)
            .await
            .unwrap();
        store
    }

    async fn seed(store: &PgStore, collection: &'static str, docs: Vec<Value>) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for mut doc in docs {
            let id = Uuid::new_v4();
            doc["id"] = json!(id.to_string());
            store.insert(collection, id, doc).await.unwrap();
            ids.push(id);
        }
        ids
    }

    #[tokio::test]
    #[ignore] // Run with: DATABASE_URL=... cargo test -- --ignored
    async fn test_get_replace_remove() {
        let store = store("pg_crud").await;
        let ids = seed(&store, "pg_crud", vec![json!({"name": "Drama"})]).await;

        let doc = store.get("pg_crud", ids[0]).await.unwrap().unwrap();
        assert_eq!(doc["name"], "Drama");
        assert_eq!(store.get("pg_crud", Uuid::new_v4()).await.unwrap(), None);

        let replaced = json!({"id": ids[0].to_string(), "name": "Comedy"});
        assert!(store.replace("pg_crud", ids[0], replaced).await.unwrap());
        assert!(!store.replace("pg_crud", Uuid::new_v4(), json!({})).await.unwrap());
        assert_eq!(store.get("pg_crud", ids[0]).await.unwrap().unwrap()["name"], "Comedy");

        assert!(store.remove("pg_crud", ids[0]).await.unwrap());
        assert!(!store.remove("pg_crud", ids[0]).await.unwrap());
    }

    #[tokio::test]
    #[ignore]
    async fn test_filters() {
        let store = store("pg_filters").await;
        let ids = seed(
            &store,
            "pg_filters",
            vec![
                json!({"family_name": "Zed", "tags": ["a", "b"], "name": "Fantasy"}),
                json!({"family_name": "Adams", "tags": ["b"], "name": "horror"}),
                json!({"family_name": "Mills", "tags": [], "name": "HORROR"}),
            ],
        )
        .await;

        let eq = [Filter::eq("family_name", "Zed")];
        assert_eq!(store.count("pg_filters", &eq).await.unwrap(), 1);

        let reference = Query::all().filter(Filter::references("id", ids[1]));
        let found = store.find("pg_filters", &reference).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["family_name"], "Adams");

        let contains = Query::all().filter(Filter::Contains { field: "tags", value: json!("b") });
        assert_eq!(store.find("pg_filters", &contains).await.unwrap().len(), 2);

        let ignore_case = [Filter::eq_ignore_case("name", "Horror")];
        assert_eq!(store.count("pg_filters", &ignore_case).await.unwrap(), 2);

        assert_eq!(store.count("pg_filters", &[Filter::ids(&ids[1..])]).await.unwrap(), 2);
        assert_eq!(store.count("pg_filters", &[]).await.unwrap(), 3);
        assert_eq!(store.count("pg_nobody", &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    #[ignore]
    async fn test_sort_by_code_point() {
        let store = store("pg_sort").await;
        seed(
            &store,
            "pg_sort",
            vec![
                json!({"family_name": "adams", "n": 1}),
                json!({"family_name": "Zed", "n": 2}),
                json!({"family_name": "Émile", "n": 3}),
                json!({"n": 4}),
                json!({"family_name": "Zed", "n": 5}),
            ],
        )
        .await;

        let sorted = store
            .find("pg_sort", &Query::all().sort_by("family_name"))
            .await
            .unwrap();
        let order: Vec<_> = sorted.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(order, vec![4, 2, 5, 1, 3]);

        let unsorted = store.find("pg_sort", &Query::all()).await.unwrap();
        let order: Vec<_> = unsorted.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
    }
}
