//! HTTP handlers for the menu: categories and products

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{Category, Product};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::category::{CategoryInput, CategoryPosition, CategoryService};
use crate::services::product::{ProductFilter, ProductInput, ProductService};
use crate::AppState;

fn products(state: &AppState) -> ProductService {
    ProductService::new(state.store.clone(), state.notifications())
}

// ============================================================================
// Storefront
// ============================================================================

/// Visible categories in menu order
pub async fn list_menu_categories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.store.clone());
    Ok(Json(service.list_visible().await?))
}

/// Available products, optionally narrowed by category or search text
pub async fn list_menu_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<Product>>> {
    let filter = ProductFilter {
        disponible: Some(true),
        ..filter
    };
    Ok(Json(products(&state).list(filter).await?))
}

pub async fn get_menu_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    Ok(Json(products(&state).get(product_id).await?))
}

pub async fn list_featured_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(products(&state).list_featured().await?))
}

// ============================================================================
// Category management
// ============================================================================

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.store.clone());
    Ok(Json(service.list().await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let service = CategoryService::new(state.store.clone());
    let category = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.store.clone());
    Ok(Json(service.update(category_id, input).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = CategoryService::new(state.store.clone());
    service.delete(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_categories(
    State(state): State<AppState>,
    Json(positions): Json<Vec<CategoryPosition>>,
) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.store.clone());
    Ok(Json(service.reorder(positions).await?))
}

pub async fn toggle_category_visibility(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.store.clone());
    Ok(Json(service.toggle_visibility(category_id).await?))
}

// ============================================================================
// Product management
// ============================================================================

/// Every product regardless of availability
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(products(&state).list(filter).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = products(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    Ok(Json(products(&state).update(product_id, input).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    products(&state).delete(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_product_availability(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    Ok(Json(products(&state).toggle_availability(product_id).await?))
}

pub async fn toggle_product_featured(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    Ok(Json(products(&state).toggle_featured(product_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StockUpdate {
    pub stock: i32,
}

pub async fn update_product_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(body): Json<StockUpdate>,
) -> AppResult<Json<Product>> {
    Ok(Json(products(&state).update_stock(product_id, body.stock).await?))
}
