//! HTTP handlers for restaurant settings

use axum::{extract::State, Json};
use shared::RestaurantSettings;

use crate::error::AppResult;
use crate::services::settings::{SettingsPatch, SettingsService};
use crate::AppState;

pub async fn get_settings(
    State(state): State<AppState>,
) -> AppResult<Json<Option<RestaurantSettings>>> {
    let service = SettingsService::new(state.store.clone());
    Ok(Json(service.get().await?))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> AppResult<Json<RestaurantSettings>> {
    let service = SettingsService::new(state.store.clone());
    Ok(Json(service.update(patch).await?))
}
