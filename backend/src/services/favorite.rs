//! Customer favorites

use shared::Favorite;
use uuid::Uuid;

use crate::error::AppResult;
use crate::store::{collections, DocumentStore, DocumentStoreExt, Query, SharedStore};

/// Favorite service
#[derive(Clone)]
pub struct FavoriteService {
    store: SharedStore,
}

impl FavoriteService {
    /// Create a new FavoriteService instance
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(&self, cliente_id: &str) -> AppResult<Vec<Favorite>> {
        let query = Query::new().equal("cliente_id", cliente_id).limit(100);
        Ok(self.store.list_models(collections::FAVORITES, query).await?)
    }

    /// Add the product to the customer's favorites, or remove it if present.
    ///
    /// Returns `true` when the product was added.
    pub async fn toggle(&self, cliente_id: &str, producto_id: Uuid) -> AppResult<bool> {
        if let Some(existing) = self.find(cliente_id, producto_id).await? {
            self.store
                .delete(collections::FAVORITES, existing.id)
                .await?;
            return Ok(false);
        }

        let favorite = Favorite {
            id: Uuid::new_v4(),
            cliente_id: cliente_id.to_string(),
            producto_id,
        };
        self.store
            .create_model(collections::FAVORITES, favorite.id, &favorite)
            .await?;
        Ok(true)
    }

    pub async fn is_favorite(&self, cliente_id: &str, producto_id: Uuid) -> AppResult<bool> {
        Ok(self.find(cliente_id, producto_id).await?.is_some())
    }

    async fn find(&self, cliente_id: &str, producto_id: Uuid) -> AppResult<Option<Favorite>> {
        let query = Query::new()
            .equal("cliente_id", cliente_id)
            .equal("producto_id", producto_id.to_string())
            .limit(1);
        let mut found: Vec<Favorite> = self.store.list_models(collections::FAVORITES, query).await?;
        Ok(found.pop())
    }
}
