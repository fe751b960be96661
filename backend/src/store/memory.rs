//! In-process document store
//!
//! Used for local development and tests. Supports write-fault injection so
//! multi-step operations can be exercised against a store that fails partway.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    with_id, Document, DocumentStore, Filter, Query, SortDirection, StoreError, StoreResult,
};

/// Documents kept per collection in insertion order
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    faults: RwLock<FaultPlan>,
}

#[derive(Default)]
struct FaultPlan {
    failing_collections: Vec<String>,
    writes_before_failure: Option<usize>,
}

impl FaultPlan {
    /// Decide whether the next write to `collection` fails, consuming budget
    fn next_write_fails(&mut self, collection: &str) -> bool {
        if self.failing_collections.iter().any(|c| c == collection) {
            return true;
        }
        match self.writes_before_failure.as_mut() {
            Some(0) => true,
            Some(remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `collection` fail until [`clear_faults`](Self::clear_faults)
    pub async fn fail_collection(&self, collection: &str) {
        self.faults
            .write()
            .await
            .failing_collections
            .push(collection.to_string());
    }

    /// Let `n` more writes succeed, then fail every write
    pub async fn fail_after_writes(&self, n: usize) {
        self.faults.write().await.writes_before_failure = Some(n);
    }

    pub async fn clear_faults(&self) {
        *self.faults.write().await = FaultPlan::default();
    }

    async fn check_write(&self, collection: &str) -> StoreResult<()> {
        if self.faults.write().await.next_write_fails(collection) {
            return Err(StoreError::Unavailable(format!(
                "injected write failure on {}",
                collection
            )));
        }
        Ok(())
    }
}

#[axum::async_trait]
impl DocumentStore for InMemoryStore {
    async fn create(&self, collection: &str, id: Uuid, data: Value) -> StoreResult<Document> {
        self.check_write(collection).await?;

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.id == id) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id,
            });
        }

        let now = Utc::now();
        let doc = Document {
            id,
            collection: collection.to_string(),
            data: with_id(data, id),
            created_at: now,
            updated_at: now,
        };
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn update(&self, collection: &str, id: Uuid, patch: Value) -> StoreResult<Document> {
        self.check_write(collection).await?;

        let mut collections = self.collections.write().await;
        let doc = find_mut(&mut collections, collection, id)?;
        merge(&mut doc.data, patch);
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn update_if(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        expected: Value,
        patch: Value,
    ) -> StoreResult<Option<Document>> {
        self.check_write(collection).await?;

        let mut collections = self.collections.write().await;
        let doc = find_mut(&mut collections, collection, id)?;
        if doc.data.get(field) != Some(&expected) {
            return Ok(None);
        }
        merge(&mut doc.data, patch);
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> StoreResult<()> {
        self.check_write(collection).await?;

        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(not_found(collection, id));
        }
        Ok(())
    }

    async fn list(&self, collection: &str, query: Query) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| query.filters.iter().all(|f| matches(&d.data, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, direction)) = &query.order_by {
            docs.sort_by(|a, b| {
                let ord = compare_fields(a.data.get(field), b.data.get(field));
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            docs.truncate(limit);
        }

        Ok(docs)
    }

    async fn count(&self, collection: &str, query: Query) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| query.filters.iter().all(|f| matches(&d.data, f)))
                    .count() as u64
            })
            .unwrap_or(0))
    }
}

fn not_found(collection: &str, id: Uuid) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id,
    }
}

fn find_mut<'a>(
    collections: &'a mut HashMap<String, Vec<Document>>,
    collection: &str,
    id: Uuid,
) -> StoreResult<&'a mut Document> {
    collections
        .get_mut(collection)
        .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        .ok_or_else(|| not_found(collection, id))
}

/// Shallow merge of a JSON object patch
fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                target.insert(key, value);
            }
        }
        (target, patch) => *target = patch,
    }
}

fn matches(data: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Equal(field, value) => data.get(field) == Some(value),
        Filter::NotEqual(field, value) => data.get(field) != Some(value),
        Filter::GreaterThan(field, value) => {
            compare_fields(data.get(field), Some(value)) == Ordering::Greater
        }
        Filter::GreaterThanEqual(field, value) => {
            data.get(field).is_some()
                && compare_fields(data.get(field), Some(value)) != Ordering::Less
        }
        Filter::LessThanEqual(field, value) => {
            data.get(field).is_some()
                && compare_fields(data.get(field), Some(value)) != Ordering::Greater
        }
        Filter::Search(field, needle) => data
            .get(field)
            .and_then(Value::as_str)
            .map(|s| s.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

/// Total order over JSON scalars; missing values sort first
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_values(a, b),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        for (name, orden, visible) in [("Bebidas", 2, true), ("Entradas", 1, true), ("Ocultos", 3, false)] {
            store
                .create(
                    "categorias",
                    Uuid::new_v4(),
                    json!({ "nombre": name, "orden": orden, "visible": visible }),
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_create_sets_id_and_rejects_duplicates() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        let doc = store.create("x", id, json!({ "a": 1 })).await.unwrap();
        assert_eq!(doc.data["id"], id.to_string());

        let err = store.create("x", id, json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_filter_order_and_limit() {
        let store = seeded().await;
        let docs = store
            .list(
                "categorias",
                Query::new().equal("visible", true).order_asc("orden"),
            )
            .await
            .unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.data["nombre"].clone()).collect();
        assert_eq!(names, vec![json!("Entradas"), json!("Bebidas")]);

        let docs = store
            .list("categorias", Query::new().order_desc("orden").limit(1))
            .await
            .unwrap();
        assert_eq!(docs[0].data["nombre"], "Ocultos");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let store = seeded().await;
        let count = store
            .count("categorias", Query::new().search("nombre", "BEB"))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_update_if_detects_stale_value() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        store
            .create("pedidos", id, json!({ "estado": "nuevo" }))
            .await
            .unwrap();

        let first = store
            .update_if("pedidos", id, "estado", json!("nuevo"), json!({ "estado": "confirmado" }))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .update_if("pedidos", id, "estado", json!("nuevo"), json!({ "estado": "cancelado" }))
            .await
            .unwrap();
        assert!(second.is_none());

        let doc = store.get("pedidos", id).await.unwrap().unwrap();
        assert_eq!(doc.data["estado"], "confirmado");
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let store = InMemoryStore::new();
        store.fail_after_writes(1).await;
        assert!(store.create("a", Uuid::new_v4(), json!({})).await.is_ok());
        assert!(store.create("a", Uuid::new_v4(), json!({})).await.is_err());

        store.clear_faults().await;
        store.fail_collection("b").await;
        assert!(store.create("a", Uuid::new_v4(), json!({})).await.is_ok());
        assert!(matches!(
            store.create("b", Uuid::new_v4(), json!({})).await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_document() {
        let store = seeded().await;
        let err = store.delete("categorias", Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
