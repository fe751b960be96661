//! Menu category service

use serde::Deserialize;
use serde_json::json;
use shared::Category;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{collections, DocumentStore, DocumentStoreExt, Query, SharedStore};

/// Category service
#[derive(Clone)]
pub struct CategoryService {
    store: SharedStore,
}

/// Input for creating or updating a category
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100, message = "El nombre es requerido"))]
    pub nombre: String,
    #[validate(range(min = 0))]
    pub orden: i32,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

/// New position of a category
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPosition {
    pub id: Uuid,
    pub orden: i32,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// All categories in menu order
    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let query = Query::new().order_asc("orden");
        Ok(self.store.list_models(collections::CATEGORIES, query).await?)
    }

    /// Categories shown on the storefront
    pub async fn list_visible(&self) -> AppResult<Vec<Category>> {
        let query = Query::new().equal("visible", true).order_asc("orden");
        Ok(self.store.list_models(collections::CATEGORIES, query).await?)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Category> {
        self.store
            .get_model(collections::CATEGORIES, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    pub async fn create(&self, input: CategoryInput) -> AppResult<Category> {
        input.validate()?;
        let category = Category {
            id: Uuid::new_v4(),
            nombre: input.nombre,
            orden: input.orden,
            visible: input.visible,
        };
        self.store
            .create_model(collections::CATEGORIES, category.id, &category)
            .await?;
        Ok(category)
    }

    pub async fn update(&self, id: Uuid, input: CategoryInput) -> AppResult<Category> {
        input.validate()?;
        self.get(id).await?;
        let doc = self
            .store
            .update(
                collections::CATEGORIES,
                id,
                json!({
                    "nombre": input.nombre,
                    "orden": input.orden,
                    "visible": input.visible,
                }),
            )
            .await?;
        Ok(doc.into_model()?)
    }

    /// Delete a category that no product uses
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.get(id).await?;
        let in_use = self
            .store
            .count(
                collections::PRODUCTS,
                Query::new().equal("categoria_id", id.to_string()),
            )
            .await?;
        if in_use > 0 {
            return Err(AppError::Conflict {
                resource: "categoria_id".to_string(),
                message: format!("Category is used by {} products", in_use),
                message_es: format!("La categoría tiene {} productos", in_use),
            });
        }
        self.store.delete(collections::CATEGORIES, id).await?;
        Ok(())
    }

    /// Apply a new menu order
    pub async fn reorder(&self, positions: Vec<CategoryPosition>) -> AppResult<Vec<Category>> {
        for position in &positions {
            if position.orden < 0 {
                return Err(AppError::invalid_field(
                    "orden",
                    "Order must be zero or more",
                    "El orden no puede ser negativo",
                ));
            }
            self.get(position.id).await?;
        }
        for position in positions {
            self.store
                .update(
                    collections::CATEGORIES,
                    position.id,
                    json!({ "orden": position.orden }),
                )
                .await?;
        }
        self.list().await
    }

    pub async fn toggle_visibility(&self, id: Uuid) -> AppResult<Category> {
        let category = self.get(id).await?;
        let doc = self
            .store
            .update(
                collections::CATEGORIES,
                id,
                json!({ "visible": !category.visible }),
            )
            .await?;
        Ok(doc.into_model()?)
    }
}
