//! Menu product service

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use shared::{check_price, Product};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::category::CategoryService;
use crate::services::notification::NotificationService;
use crate::store::{collections, DocumentStore, DocumentStoreExt, Query, SharedStore};

/// Product service
#[derive(Clone)]
pub struct ProductService {
    store: SharedStore,
    notifications: NotificationService,
}

/// Input for creating or updating a product
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 200, message = "El nombre es requerido"))]
    pub nombre: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub descripcion: String,
    #[validate(custom = "check_price")]
    pub precio: Decimal,
    pub categoria_id: Uuid,
    #[serde(default)]
    pub imagen_url: String,
    #[serde(default = "default_available")]
    pub disponible: bool,
    #[serde(default)]
    pub destacado: bool,
    #[serde(default)]
    pub etiquetas: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock: i32,
    #[serde(default)]
    pub ingredientes: Vec<String>,
    #[serde(default)]
    pub opciones: serde_json::Value,
}

fn default_available() -> bool {
    true
}

/// Filters for listing products
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub categoria_id: Option<Uuid>,
    pub disponible: Option<bool>,
    pub destacado: Option<bool>,
    pub search: Option<String>,
}

impl ProductInput {
    fn into_product(self, id: Uuid) -> Product {
        Product {
            id,
            nombre: self.nombre,
            descripcion: self.descripcion,
            precio: self.precio,
            categoria_id: self.categoria_id,
            imagen_url: self.imagen_url,
            disponible: self.disponible,
            destacado: self.destacado,
            etiquetas: self.etiquetas,
            stock: self.stock,
            ingredientes: self.ingredientes,
            opciones: self.opciones,
        }
    }
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(store: SharedStore, notifications: NotificationService) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Products matching the filters, by name
    pub async fn list(&self, filter: ProductFilter) -> AppResult<Vec<Product>> {
        let mut query = Query::new().order_asc("nombre");
        if let Some(categoria_id) = filter.categoria_id {
            query = query.equal("categoria_id", categoria_id.to_string());
        }
        if let Some(disponible) = filter.disponible {
            query = query.equal("disponible", disponible);
        }
        if let Some(destacado) = filter.destacado {
            query = query.equal("destacado", destacado);
        }
        if let Some(search) = filter.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                query = query.search("nombre", search);
            }
        }
        Ok(self.store.list_models(collections::PRODUCTS, query).await?)
    }

    pub async fn list_available(&self) -> AppResult<Vec<Product>> {
        self.list(ProductFilter {
            disponible: Some(true),
            ..Default::default()
        })
        .await
    }

    /// Featured products that can be ordered
    pub async fn list_featured(&self) -> AppResult<Vec<Product>> {
        self.list(ProductFilter {
            disponible: Some(true),
            destacado: Some(true),
            ..Default::default()
        })
        .await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Product> {
        self.store
            .get_model(collections::PRODUCTS, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn create(&self, input: ProductInput) -> AppResult<Product> {
        input.validate()?;
        self.ensure_category(input.categoria_id).await?;

        let product = input.into_product(Uuid::new_v4());
        self.store
            .create_model(collections::PRODUCTS, product.id, &product)
            .await?;
        tracing::info!(product_id = %product.id, "Product created: {}", product.nombre);
        Ok(product)
    }

    pub async fn update(&self, id: Uuid, input: ProductInput) -> AppResult<Product> {
        input.validate()?;
        self.get(id).await?;
        self.ensure_category(input.categoria_id).await?;

        let product = input.into_product(id);
        let patch = serde_json::to_value(&product).map_err(crate::store::StoreError::from)?;
        self.store.update(collections::PRODUCTS, id, patch).await?;
        Ok(product)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.get(id).await?;
        self.store.delete(collections::PRODUCTS, id).await?;
        Ok(())
    }

    pub async fn toggle_availability(&self, id: Uuid) -> AppResult<Product> {
        let product = self.get(id).await?;
        self.patch(id, json!({ "disponible": !product.disponible })).await
    }

    pub async fn toggle_featured(&self, id: Uuid) -> AppResult<Product> {
        let product = self.get(id).await?;
        self.patch(id, json!({ "destacado": !product.destacado })).await
    }

    /// Set the stock level. Availability follows stock, and the admin hears
    /// about nearly sold-out products.
    pub async fn update_stock(&self, id: Uuid, stock: i32) -> AppResult<Product> {
        if stock < 0 {
            return Err(AppError::invalid_field(
                "stock",
                "Stock cannot be negative",
                "El stock no puede ser negativo",
            ));
        }
        self.get(id).await?;

        let product = self
            .patch(id, json!({ "stock": stock, "disponible": stock > 0 }))
            .await?;

        if product.is_low_stock() {
            if let Err(e) = self.notifications.notify_low_stock(&product).await {
                tracing::warn!("Failed to send low stock alert for {}: {}", product.id, e);
            }
        }
        Ok(product)
    }

    async fn patch(&self, id: Uuid, patch: serde_json::Value) -> AppResult<Product> {
        let doc = self.store.update(collections::PRODUCTS, id, patch).await?;
        Ok(doc.into_model()?)
    }

    async fn ensure_category(&self, categoria_id: Uuid) -> AppResult<()> {
        match CategoryService::new(self.store.clone()).get(categoria_id).await {
            Ok(_) => Ok(()),
            Err(AppError::NotFound(_)) => Err(AppError::invalid_field(
                "categoria_id",
                "Category does not exist",
                "La categoría no existe",
            )),
            Err(e) => Err(e),
        }
    }
}
