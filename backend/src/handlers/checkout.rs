//! HTTP handlers for checkout

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use shared::Cart;

use crate::error::AppResult;
use crate::middleware::MaybeUser;
use crate::services::checkout::{CheckoutForm, CheckoutPreview, CheckoutReceipt, CheckoutService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub cart: Cart,
    #[serde(default)]
    pub include_shipping: bool,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub cart: Cart,
    #[serde(flatten)]
    pub form: CheckoutForm,
}

/// Totals for the cart with the promotions running now
pub async fn preview_checkout(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> AppResult<Json<CheckoutPreview>> {
    let service = CheckoutService::new(state.store.clone(), &state.config);
    let preview = service
        .preview(&request.cart, request.include_shipping)
        .await?;
    Ok(Json(preview))
}

/// Place an order; guests may check out without a token
pub async fn submit_checkout(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(request): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<CheckoutReceipt>)> {
    let service = CheckoutService::new(state.store.clone(), &state.config);
    let receipt = service
        .checkout(&request.cart, request.form, user.map(|u| u.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
