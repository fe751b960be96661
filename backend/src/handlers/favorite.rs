//! HTTP handlers for customer favorites

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use shared::Favorite;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::favorite::FavoriteService;
use crate::AppState;

#[derive(Serialize)]
pub struct FavoriteStatus {
    pub producto_id: Uuid,
    pub favorito: bool,
}

pub async fn list_favorites(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Favorite>>> {
    let service = FavoriteService::new(state.store.clone());
    Ok(Json(service.list(&current_user.0.user_id).await?))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<FavoriteStatus>> {
    let service = FavoriteService::new(state.store.clone());
    let favorito = service.toggle(&current_user.0.user_id, product_id).await?;
    Ok(Json(FavoriteStatus {
        producto_id: product_id,
        favorito,
    }))
}

pub async fn get_favorite_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<FavoriteStatus>> {
    let service = FavoriteService::new(state.store.clone());
    let favorito = service
        .is_favorite(&current_user.0.user_id, product_id)
        .await?;
    Ok(Json(FavoriteStatus {
        producto_id: product_id,
        favorito,
    }))
}
