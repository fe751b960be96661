//! Themed storefront events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{check_hex_color, validate_window, Event};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{
    collections, timestamp_value, DocumentStore, DocumentStoreExt, Query, SharedStore,
};

/// Event service
#[derive(Clone)]
pub struct EventService {
    store: SharedStore,
}

/// Input for creating or updating an event
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EventInput {
    #[validate(length(min = 1, max = 200, message = "El nombre es requerido"))]
    pub nombre: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub descripcion: String,
    #[serde(default)]
    pub imagen: String,
    #[serde(default = "default_color")]
    #[validate(custom = "check_hex_color")]
    pub color_tema: String,
    #[serde(with = "shared::types::timestamp")]
    pub fecha_inicio: DateTime<Utc>,
    #[serde(with = "shared::types::timestamp")]
    pub fecha_fin: DateTime<Utc>,
    #[serde(default)]
    pub activo: bool,
}

fn default_color() -> String {
    "#ff6b35".to_string()
}

/// The running event with its countdown
#[derive(Debug, Clone, Serialize)]
pub struct ActiveEvent {
    #[serde(flatten)]
    pub evento: Event,
    pub cuenta_regresiva: String,
}

impl EventInput {
    fn into_event(self, id: Uuid) -> AppResult<Event> {
        self.validate()?;
        validate_window(self.fecha_inicio, self.fecha_fin).map_err(|m| {
            AppError::invalid_field(
                "fecha_fin",
                m,
                "La fecha de fin no puede ser anterior a la de inicio",
            )
        })?;
        Ok(Event {
            id,
            nombre: self.nombre,
            descripcion: self.descripcion,
            imagen: self.imagen,
            color_tema: self.color_tema,
            fecha_inicio: self.fecha_inicio,
            fecha_fin: self.fecha_fin,
            activo: self.activo,
        })
    }
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Event>> {
        let query = Query::new().order_desc("fecha_inicio").limit(100);
        Ok(self.store.list_models(collections::EVENTS, query).await?)
    }

    /// First switched-on event whose window contains `now`
    pub async fn active(&self, now: DateTime<Utc>) -> AppResult<Option<ActiveEvent>> {
        let query = Query::new()
            .equal("activo", true)
            .less_than_equal("fecha_inicio", timestamp_value(&now))
            .greater_than_equal("fecha_fin", timestamp_value(&now))
            .order_asc("fecha_inicio");
        let events: Vec<Event> = self.store.list_models(collections::EVENTS, query).await?;

        Ok(events
            .into_iter()
            .find(|e| e.is_running(now))
            .map(|evento| ActiveEvent {
                cuenta_regresiva: evento.countdown(now),
                evento,
            }))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Event> {
        self.store
            .get_model(collections::EVENTS, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event".to_string()))
    }

    pub async fn create(&self, input: EventInput) -> AppResult<Event> {
        let event = input.into_event(Uuid::new_v4())?;
        self.store
            .create_model(collections::EVENTS, event.id, &event)
            .await?;
        Ok(event)
    }

    pub async fn update(&self, id: Uuid, input: EventInput) -> AppResult<Event> {
        self.get(id).await?;
        let event = input.into_event(id)?;
        let patch = serde_json::to_value(&event).map_err(crate::store::StoreError::from)?;
        self.store.update(collections::EVENTS, id, patch).await?;
        Ok(event)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.get(id).await?;
        self.store.delete(collections::EVENTS, id).await?;
        Ok(())
    }

    pub async fn toggle_active(&self, id: Uuid) -> AppResult<Event> {
        let event = self.get(id).await?;
        let doc = self
            .store
            .update(collections::EVENTS, id, json!({ "activo": !event.activo }))
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

    fn input(nombre: &str, start: DateTime<Utc>, end: DateTime<Utc>, activo: bool) -> EventInput {
        EventInput {
            nombre: nombre.to_string(),
            descripcion: String::new(),
            imagen: String::new(),
            color_tema: default_color(),
            fecha_inicio: start,
            fecha_fin: end,
            activo,
        }
    }

    #[tokio::test]
    async fn test_active_event() {
        let service = EventService::new(Arc::new(InMemoryStore::new()));
        let now = Utc::now();
        assert!(service.active(now).await.unwrap().is_none());

        service
            .create(input("Pasado", now - Duration::days(5), now - Duration::days(4), true))
            .await
            .unwrap();
        let dormant = service
            .create(input(
                "Apagado",
                now - Duration::days(1),
                now + Duration::hours(22) + Duration::minutes(30),
                false,
            ))
            .await
            .unwrap();
        assert!(service.active(now).await.unwrap().is_none());

        service.toggle_active(dormant.id).await.unwrap();
        let active = service.active(now).await.unwrap().unwrap();
        assert_eq!(active.evento.id, dormant.id);
        assert!(active.cuenta_regresiva.starts_with("22h 29m") || active.cuenta_regresiva.starts_with("22h 30m"));
    }

    #[tokio::test]
    async fn test_rejects_bad_color_and_window() {
        let service = EventService::new(Arc::new(InMemoryStore::new()));
        let now = Utc::now();

        let mut bad_color = input("Color", now, now + Duration::days(1), true);
        bad_color.color_tema = "naranja".to_string();
        assert!(matches!(
            service.create(bad_color).await.unwrap_err(),
            AppError::Validation { .. }
        ));

        let backwards = input("Al revés", now, now - Duration::days(1), true);
        assert!(matches!(
            service.create(backwards).await.unwrap_err(),
            AppError::Validation { .. }
        ));
    }
}
