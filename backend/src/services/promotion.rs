//! Promotion management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use shared::{validate_non_negative, validate_percentage, validate_window, Promotion, PromotionKind};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{
    collections, timestamp_value, DocumentStore, DocumentStoreExt, Query, SharedStore,
};

/// Promotion service
#[derive(Clone)]
pub struct PromotionService {
    store: SharedStore,
}

/// Input for creating or replacing a promotion
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionInput {
    pub tipo: String,
    #[serde(default)]
    pub valor: Decimal,
    #[serde(default)]
    pub productos_aplicables: Vec<Uuid>,
    #[serde(with = "shared::types::timestamp")]
    pub fecha_inicio: DateTime<Utc>,
    #[serde(with = "shared::types::timestamp")]
    pub fecha_fin: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub activa: bool,
}

fn default_active() -> bool {
    true
}

impl PromotionInput {
    /// Check the input and build the promotion kind
    fn to_kind(&self) -> AppResult<PromotionKind> {
        let kind = PromotionKind::from_parts(&self.tipo, self.valor).ok_or_else(|| {
            AppError::invalid_field(
                "tipo",
                "Type must be porcentaje, monto_fijo or 2x1",
                "El tipo debe ser porcentaje, monto_fijo o 2x1",
            )
        })?;

        validate_non_negative(self.valor).map_err(|m| {
            AppError::invalid_field("valor", m, "El valor no puede ser negativo")
        })?;
        if let PromotionKind::Percentage { percent } = &kind {
            validate_percentage(*percent).map_err(|m| {
                AppError::invalid_field("valor", m, "El porcentaje debe estar entre 0 y 100")
            })?;
        }
        validate_window(self.fecha_inicio, self.fecha_fin).map_err(|m| {
            AppError::invalid_field(
                "fecha_fin",
                m,
                "La fecha de fin no puede ser anterior a la de inicio",
            )
        })?;

        Ok(kind)
    }
}

impl PromotionService {
    /// Create a new PromotionService instance
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// All promotions, newest window first
    pub async fn list(&self) -> AppResult<Vec<Promotion>> {
        let query = Query::new().order_desc("fecha_inicio");
        Ok(self.store.list_models(collections::PROMOTIONS, query).await?)
    }

    /// Promotions whose window contains `now` and that are switched on
    pub async fn list_active(&self, now: DateTime<Utc>) -> AppResult<Vec<Promotion>> {
        let query = Query::new()
            .equal("activa", true)
            .less_than_equal("fecha_inicio", timestamp_value(&now))
            .greater_than_equal("fecha_fin", timestamp_value(&now));
        let promotions: Vec<Promotion> =
            self.store.list_models(collections::PROMOTIONS, query).await?;
        Ok(promotions.into_iter().filter(|p| p.is_active(now)).collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Promotion> {
        self.store
            .get_model(collections::PROMOTIONS, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Promotion".to_string()))
    }

    pub async fn create(&self, input: PromotionInput) -> AppResult<Promotion> {
        let promotion = Promotion {
            id: Uuid::new_v4(),
            kind: input.to_kind()?,
            productos_aplicables: input.productos_aplicables,
            fecha_inicio: input.fecha_inicio,
            fecha_fin: input.fecha_fin,
            activa: input.activa,
        };
        self.store
            .create_model(collections::PROMOTIONS, promotion.id, &promotion)
            .await?;

        tracing::info!(promotion_id = %promotion.id, tipo = promotion.kind.tipo(), "Promotion created");
        Ok(promotion)
    }

    /// Replace every field of a promotion
    pub async fn update(&self, id: Uuid, input: PromotionInput) -> AppResult<Promotion> {
        self.get(id).await?;
        let promotion = Promotion {
            id,
            kind: input.to_kind()?,
            productos_aplicables: input.productos_aplicables,
            fecha_inicio: input.fecha_inicio,
            fecha_fin: input.fecha_fin,
            activa: input.activa,
        };
        let patch = serde_json::to_value(&promotion).map_err(crate::store::StoreError::from)?;
        self.store
            .update(collections::PROMOTIONS, id, patch)
            .await?;
        Ok(promotion)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.get(id).await?;
        self.store.delete(collections::PROMOTIONS, id).await?;
        Ok(())
    }

    /// Flip the `activa` switch
    pub async fn toggle_active(&self, id: Uuid) -> AppResult<Promotion> {
        let promotion = self.get(id).await?;
        let doc = self
            .store
            .update(
                collections::PROMOTIONS,
                id,
                json!({ "activa": !promotion.activa }),
            )
            .await?;
        Ok(doc.into_model()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::Duration;
    use std::sync::Arc;

    fn service() -> PromotionService {
        PromotionService::new(Arc::new(InMemoryStore::new()))
    }

    fn input(tipo: &str, valor: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> PromotionInput {
        PromotionInput {
            tipo: tipo.to_string(),
            valor: Decimal::from(valor),
            productos_aplicables: vec![],
            fecha_inicio: start,
            fecha_fin: end,
            activa: true,
        }
    }

    #[tokio::test]
    async fn test_list_active_respects_window_and_switch() {
        let service = service();
        let now = Utc::now();
        let running = service
            .create(input("porcentaje", 10, now - Duration::days(1), now + Duration::days(1)))
            .await
            .unwrap();
        service
            .create(input("2x1", 0, now + Duration::days(1), now + Duration::days(2)))
            .await
            .unwrap();
        service
            .create(input("monto_fijo", 500, now - Duration::days(3), now - Duration::days(2)))
            .await
            .unwrap();

        let active = service.list_active(now).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, running.id);

        let toggled = service.toggle_active(running.id).await.unwrap();
        assert!(!toggled.activa);
        assert!(service.list_active(now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation() {
        let service = service();
        let now = Utc::now();
        let later = now + Duration::days(1);

        for bad in [
            input("porcentaje", 101, now, later),
            input("monto_fijo", -1, now, later),
            input("3x2", 10, now, later),
            input("porcentaje", 10, later, now),
        ] {
            let err = service.create(bad).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_update_replaces_kind() {
        let service = service();
        let now = Utc::now();
        let created = service
            .create(input("porcentaje", 10, now, now + Duration::days(1)))
            .await
            .unwrap();
        let updated = service
            .update(created.id, input("monto_fijo", 2500, now, now + Duration::days(1)))
            .await
            .unwrap();
        assert_eq!(
            updated.kind,
            PromotionKind::FixedAmount {
                amount: Decimal::from(2500)
            }
        );
        assert_eq!(service.get(created.id).await.unwrap().kind, updated.kind);

        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.get(created.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
