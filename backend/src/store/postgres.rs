//! PostgreSQL-backed document store
//!
//! All collections share one `documents` table with a JSONB body.
//! Field predicates compare JSONB values, so strings compare as text and
//! numbers numerically.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    with_id, Document, DocumentStore, Filter, Query, SortDirection, StoreError, StoreResult,
};

#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

/// Database row for a document
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    collection: String,
    data: Json<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            collection: row.collection,
            data: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, collection, data, created_at, updated_at";

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn exists(&self, collection: &str, id: Uuid) -> StoreResult<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        Ok(found > 0)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) {
    for filter in filters {
        builder.push(" AND ");
        match filter {
            Filter::Equal(field, value) => {
                builder.push("data -> ");
                builder.push_bind(field.clone());
                builder.push(" = ");
                builder.push_bind(Json(value.clone()));
            }
            Filter::NotEqual(field, value) => {
                builder.push("(data -> ");
                builder.push_bind(field.clone());
                builder.push(") IS DISTINCT FROM ");
                builder.push_bind(Json(value.clone()));
            }
            Filter::GreaterThan(field, value) => {
                builder.push("data -> ");
                builder.push_bind(field.clone());
                builder.push(" > ");
                builder.push_bind(Json(value.clone()));
            }
            Filter::GreaterThanEqual(field, value) => {
                builder.push("data -> ");
                builder.push_bind(field.clone());
                builder.push(" >= ");
                builder.push_bind(Json(value.clone()));
            }
            Filter::LessThanEqual(field, value) => {
                builder.push("data -> ");
                builder.push_bind(field.clone());
                builder.push(" <= ");
                builder.push_bind(Json(value.clone()));
            }
            Filter::Search(field, needle) => {
                builder.push("data ->> ");
                builder.push_bind(field.clone());
                builder.push(" ILIKE ");
                builder.push_bind(format!("%{}%", escape_like(needle)));
            }
        }
    }
}

fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[axum::async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create(&self, collection: &str, id: Uuid, data: Value) -> StoreResult<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            RETURNING {COLUMNS}
            "#
        ))
        .bind(collection)
        .bind(id)
        .bind(Json(with_id(data, id)))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| StoreError::AlreadyExists {
            collection: collection.to_string(),
            id,
        })?;

        Ok(row.into())
    }

    async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = $1 AND id = $2"
        ))
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Document::from))
    }

    async fn update(&self, collection: &str, id: Uuid, patch: Value) -> StoreResult<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(collection)
        .bind(id)
        .bind(Json(patch))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id,
        })?;

        Ok(row.into())
    }

    async fn update_if(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        expected: Value,
        patch: Value,
    ) -> StoreResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2 AND data -> $4 = $5
            RETURNING {COLUMNS}
            "#
        ))
        .bind(collection)
        .bind(id)
        .bind(Json(patch))
        .bind(field)
        .bind(Json(expected))
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => Ok(Some(row.into())),
            None if self.exists(collection, id).await? => Ok(None),
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id,
            }),
        }
    }

    async fn delete(&self, collection: &str, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id,
            });
        }
        Ok(())
    }

    async fn list(&self, collection: &str, query: Query) -> StoreResult<Vec<Document>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = "
        ));
        builder.push_bind(collection.to_string());
        push_filters(&mut builder, &query.filters);

        match &query.order_by {
            Some((field, direction)) => {
                builder.push(" ORDER BY data -> ");
                builder.push_bind(field.clone());
                builder.push(match direction {
                    SortDirection::Asc => " ASC, seq ASC",
                    SortDirection::Desc => " DESC, seq DESC",
                });
            }
            None => {
                builder.push(" ORDER BY seq ASC");
            }
        }

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit as i64);
        }

        let rows = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn count(&self, collection: &str, query: Query) -> StoreResult<u64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents WHERE collection = ");
        builder.push_bind(collection.to_string());
        push_filters(&mut builder, &query.filters);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.db).await?;
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db).await.is_ok()
    }
}
