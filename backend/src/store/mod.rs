//! Document store abstraction
//!
//! The platform keeps its records as JSON documents in named collections.
//! Services talk to the store only through [`DocumentStore`]; the backing
//! engine is chosen at startup.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgDocumentStore;

/// Collection names
pub mod collections {
    pub const CATEGORIES: &str = "categorias";
    pub const PRODUCTS: &str = "productos";
    pub const PROMOTIONS: &str = "promociones";
    pub const ORDERS: &str = "pedidos";
    pub const ORDER_ITEMS: &str = "pedido_items";
    pub const FAVORITES: &str = "favoritos";
    pub const EVENTS: &str = "eventos";
    pub const NOTIFICATIONS: &str = "notificaciones";
    pub const STATUS_HISTORY: &str = "historial_estados";
    pub const SETTINGS: &str = "configuracion";
}

/// Store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document {id} not found in {collection}")]
    NotFound { collection: String, id: Uuid },

    #[error("Document {id} already exists in {collection}")]
    AlreadyExists { collection: String, id: Uuid },

    #[error("Malformed document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A stored document with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub collection: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Deserialize the body into a model
    pub fn into_model<T: DeserializeOwned>(self) -> StoreResult<T> {
        Ok(serde_json::from_value(self.data)?)
    }
}

/// Field predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equal(String, Value),
    NotEqual(String, Value),
    GreaterThan(String, Value),
    GreaterThanEqual(String, Value),
    LessThanEqual(String, Value),
    /// Case-insensitive substring match on a string field
    Search(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A list query: all filters must match
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equal(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Equal(field.to_string(), value.into()));
        self
    }

    pub fn not_equal(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters
            .push(Filter::NotEqual(field.to_string(), value.into()));
        self
    }

    pub fn greater_than(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters
            .push(Filter::GreaterThan(field.to_string(), value.into()));
        self
    }

    pub fn greater_than_equal(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters
            .push(Filter::GreaterThanEqual(field.to_string(), value.into()));
        self
    }

    pub fn less_than_equal(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters
            .push(Filter::LessThanEqual(field.to_string(), value.into()));
        self
    }

    pub fn search(mut self, field: &str, needle: &str) -> Self {
        self.filters
            .push(Filter::Search(field.to_string(), needle.to_string()));
        self
    }

    pub fn order_asc(mut self, field: &str) -> Self {
        self.order_by = Some((field.to_string(), SortDirection::Asc));
        self
    }

    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_by = Some((field.to_string(), SortDirection::Desc));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Stamp the document id into its body so models deserialize with it
pub(crate) fn with_id(mut data: Value, id: Uuid) -> Value {
    if let Value::Object(map) = &mut data {
        map.insert("id".to_string(), Value::String(id.to_string()));
    }
    data
}

/// Timestamp as it appears inside stored documents
pub fn timestamp_value(value: &DateTime<Utc>) -> Value {
    Value::String(shared::format_timestamp(value))
}

/// Store handle shared by services
pub type SharedStore = Arc<dyn DocumentStore>;

/// The document database collaborator
#[axum::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, collection: &str, id: Uuid, data: Value) -> StoreResult<Document>;

    async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>>;

    /// Merge `patch` (a JSON object) into the document
    async fn update(&self, collection: &str, id: Uuid, patch: Value) -> StoreResult<Document>;

    /// Merge `patch` only if `field` still equals `expected`.
    ///
    /// Returns `Ok(None)` when the document changed underneath the caller.
    async fn update_if(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        expected: Value,
        patch: Value,
    ) -> StoreResult<Option<Document>>;

    async fn delete(&self, collection: &str, id: Uuid) -> StoreResult<()>;

    async fn list(&self, collection: &str, query: Query) -> StoreResult<Vec<Document>>;

    /// Number of documents matching the filters; ordering and limit are ignored
    async fn count(&self, collection: &str, query: Query) -> StoreResult<u64>;

    /// Connectivity probe for the health endpoint
    async fn ping(&self) -> bool {
        true
    }
}

/// Typed helpers layered over [`DocumentStore`]
#[axum::async_trait]
pub trait DocumentStoreExt: DocumentStore {
    async fn create_model<T>(&self, collection: &str, id: Uuid, model: &T) -> StoreResult<Document>
    where
        T: Serialize + Sync,
    {
        let data = serde_json::to_value(model)?;
        self.create(collection, id, data).await
    }

    async fn get_model<T>(&self, collection: &str, id: Uuid) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(collection, id).await? {
            Some(doc) => Ok(Some(doc.into_model()?)),
            None => Ok(None),
        }
    }

    async fn list_models<T>(&self, collection: &str, query: Query) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.list(collection, query)
            .await?
            .into_iter()
            .map(Document::into_model)
            .collect()
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}
