//! HTTP handlers for themed storefront events

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use shared::Event;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::event::{ActiveEvent, EventInput, EventService};
use crate::AppState;

/// The running event, or `null`
pub async fn get_active_event(
    State(state): State<AppState>,
) -> AppResult<Json<Option<ActiveEvent>>> {
    let service = EventService::new(state.store.clone());
    Ok(Json(service.active(Utc::now()).await?))
}

pub async fn list_events(State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    let service = EventService::new(state.store.clone());
    Ok(Json(service.list().await?))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<Event>> {
    let service = EventService::new(state.store.clone());
    Ok(Json(service.get(event_id).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(input): Json<EventInput>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let service = EventService::new(state.store.clone());
    let event = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(input): Json<EventInput>,
) -> AppResult<Json<Event>> {
    let service = EventService::new(state.store.clone());
    Ok(Json(service.update(event_id, input).await?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = EventService::new(state.store.clone());
    service.delete(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<Event>> {
    let service = EventService::new(state.store.clone());
    Ok(Json(service.toggle_active(event_id).await?))
}
