//! HTTP handlers for orders: tracking, the customer's history and the
//! back-office board

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{Order, OrderItem, OrderStatus, StatusHistoryEntry};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::order::{BoardSnapshot, OrderAudit, OrderFilter, OrderService, OrderTracking};
use crate::AppState;

fn orders(state: &AppState) -> OrderService {
    OrderService::new(state.store.clone(), &state.config)
}

// ============================================================================
// Customer
// ============================================================================

/// Order, items and history for the tracking page
pub async fn track_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderTracking>> {
    Ok(Json(orders(&state).tracking(order_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct MyOrdersQuery {
    pub estado: Option<OrderStatus>,
    pub limit: Option<usize>,
}

/// The caller's own orders, newest first
pub async fn list_my_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<MyOrdersQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let filter = OrderFilter {
        estado: query.estado,
        cliente_id: Some(current_user.0.user_id),
        limit: query.limit,
    };
    Ok(Json(orders(&state).list(filter).await?))
}

// ============================================================================
// Back-office
// ============================================================================

pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(orders(&state).list(filter).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    Ok(Json(orders(&state).get(order_id).await?))
}

pub async fn list_order_items(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<OrderItem>>> {
    Ok(Json(orders(&state).items(order_id).await?))
}

pub async fn list_order_history(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<StatusHistoryEntry>>> {
    Ok(Json(orders(&state).history(order_id).await?))
}

/// Kanban board snapshot
pub async fn get_order_board(State(state): State<AppState>) -> AppResult<Json<BoardSnapshot>> {
    Ok(Json(orders(&state).board().await?))
}

#[derive(Debug, Deserialize)]
pub struct ChangesQuery {
    pub since: DateTime<Utc>,
}

/// Orders updated after `since`, for new-order and status toasts
pub async fn list_order_changes(
    State(state): State<AppState>,
    Query(query): Query<ChangesQuery>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(orders(&state).changes(query.since).await?))
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub estado: OrderStatus,
}

pub async fn transition_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> AppResult<Json<Order>> {
    let order = orders(&state)
        .transition(order_id, request.estado, &current_user.0.user_id)
        .await?;
    Ok(Json(order))
}

/// Replay the history and check it against the stored order
pub async fn audit_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderAudit>> {
    Ok(Json(orders(&state).audit(order_id).await?))
}
