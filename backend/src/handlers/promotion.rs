//! HTTP handlers for promotions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use shared::Promotion;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::promotion::{PromotionInput, PromotionService};
use crate::AppState;

/// Promotions running right now
pub async fn list_active_promotions(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Promotion>>> {
    let service = PromotionService::new(state.store.clone());
    Ok(Json(service.list_active(Utc::now()).await?))
}

pub async fn list_promotions(State(state): State<AppState>) -> AppResult<Json<Vec<Promotion>>> {
    let service = PromotionService::new(state.store.clone());
    Ok(Json(service.list().await?))
}

pub async fn get_promotion(
    State(state): State<AppState>,
    Path(promotion_id): Path<Uuid>,
) -> AppResult<Json<Promotion>> {
    let service = PromotionService::new(state.store.clone());
    Ok(Json(service.get(promotion_id).await?))
}

pub async fn create_promotion(
    State(state): State<AppState>,
    Json(input): Json<PromotionInput>,
) -> AppResult<(StatusCode, Json<Promotion>)> {
    let service = PromotionService::new(state.store.clone());
    let promotion = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

pub async fn update_promotion(
    State(state): State<AppState>,
    Path(promotion_id): Path<Uuid>,
    Json(input): Json<PromotionInput>,
) -> AppResult<Json<Promotion>> {
    let service = PromotionService::new(state.store.clone());
    Ok(Json(service.update(promotion_id, input).await?))
}

pub async fn delete_promotion(
    State(state): State<AppState>,
    Path(promotion_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = PromotionService::new(state.store.clone());
    service.delete(promotion_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_promotion(
    State(state): State<AppState>,
    Path(promotion_id): Path<Uuid>,
) -> AppResult<Json<Promotion>> {
    let service = PromotionService::new(state.store.clone());
    Ok(Json(service.toggle_active(promotion_id).await?))
}
