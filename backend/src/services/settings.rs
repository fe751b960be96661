//! Restaurant settings (a single document)

use serde::Deserialize;
use shared::{check_phone, RestaurantSettings};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::store::{collections, DocumentStore, DocumentStoreExt, Query, SharedStore};

/// Settings service
#[derive(Clone)]
pub struct SettingsService {
    store: SharedStore,
}

/// Partial update; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SettingsPatch {
    #[validate(length(min = 1, max = 200))]
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    #[validate(custom = "check_phone")]
    pub telefono: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub logo_url: Option<String>,
    pub horarios: Option<serde_json::Value>,
    pub redes_sociales: Option<serde_json::Value>,
}

impl SettingsService {
    /// Create a new SettingsService instance
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get(&self) -> AppResult<Option<RestaurantSettings>> {
        let mut found: Vec<RestaurantSettings> = self
            .store
            .list_models(collections::SETTINGS, Query::new().limit(1))
            .await?;
        Ok(found.pop())
    }

    /// Apply the patch, creating the settings document on first use
    pub async fn update(&self, patch: SettingsPatch) -> AppResult<RestaurantSettings> {
        patch.validate()?;

        let (mut settings, exists) = match self.get().await? {
            Some(current) => (current, true),
            None => (
                RestaurantSettings {
                    id: Uuid::new_v4(),
                    ..Default::default()
                },
                false,
            ),
        };

        if let Some(nombre) = patch.nombre {
            settings.nombre = nombre;
        }
        if patch.direccion.is_some() {
            settings.direccion = patch.direccion;
        }
        if patch.telefono.is_some() {
            settings.telefono = patch.telefono;
        }
        if patch.email.is_some() {
            settings.email = patch.email;
        }
        if patch.logo_url.is_some() {
            settings.logo_url = patch.logo_url;
        }
        if patch.horarios.is_some() {
            settings.horarios = patch.horarios;
        }
        if patch.redes_sociales.is_some() {
            settings.redes_sociales = patch.redes_sociales;
        }

        if exists {
            let data = serde_json::to_value(&settings).map_err(crate::store::StoreError::from)?;
            self.store
                .update(collections::SETTINGS, settings.id, data)
                .await?;
        } else {
            self.store
                .create_model(collections::SETTINGS, settings.id, &settings)
                .await?;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_update_upserts_single_document() {
        let service = SettingsService::new(Arc::new(InMemoryStore::new()));
        assert!(service.get().await.unwrap().is_none());

        let created = service
            .update(SettingsPatch {
                nombre: Some("JM Restaurant".to_string()),
                telefono: Some("+57 300 123 4567".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = service
            .update(SettingsPatch {
                direccion: Some("Carrera 7 #12-34".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.nombre, "JM Restaurant");

        let stored = service.get().await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_rejects_bad_email() {
        let service = SettingsService::new(Arc::new(InMemoryStore::new()));
        let result = service
            .update(SettingsPatch {
                email: Some("no-es-un-correo".to_string()),
                ..Default::default()
            })
            .await;
        assert!(result.is_err());
    }
}
