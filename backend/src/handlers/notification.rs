//! HTTP handlers for notification inboxes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::Notification;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::notification::SendNotificationInput;
use crate::AppState;

/// Query parameters for listing notifications
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub unread_only: Option<bool>,
}

/// Get the caller's notifications
pub async fn get_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let service = state.notifications();
    let user_id = &current_user.0.user_id;
    let notifications = if query.unread_only.unwrap_or(false) {
        service.list_unread(user_id).await?
    } else {
        service.list(user_id).await?
    };
    Ok(Json(notifications))
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Get unread notification count
pub async fn get_unread_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UnreadCountResponse>> {
    let count = state
        .notifications()
        .unread_count(&current_user.0.user_id)
        .await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .notifications()
        .mark_as_read(&current_user.0.user_id, notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<MarkAllReadResponse>> {
    let updated = state
        .notifications()
        .mark_all_as_read(&current_user.0.user_id)
        .await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

/// Send a notification to any user (back-office)
pub async fn send_notification(
    State(state): State<AppState>,
    Json(input): Json<SendNotificationInput>,
) -> AppResult<(StatusCode, Json<Notification>)> {
    let notification = state.notifications().send(input).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}
