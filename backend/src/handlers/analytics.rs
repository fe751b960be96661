//! Analytics handlers for the back-office dashboard and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::analytics::{
    AnalyticsService, DashboardKpis, HourBucket, StatusCount, TopProduct,
};
use crate::AppState;

#[derive(Deserialize)]
pub struct DailySalesQuery {
    pub days: Option<i64>,
    pub format: Option<String>, // "json" or "csv"
}

pub async fn get_kpis(State(state): State<AppState>) -> AppResult<Json<DashboardKpis>> {
    let service = AnalyticsService::new(state.store.clone());
    Ok(Json(service.kpis(Utc::now()).await?))
}

pub async fn get_top_product(
    State(state): State<AppState>,
) -> AppResult<Json<Option<TopProduct>>> {
    let service = AnalyticsService::new(state.store.clone());
    Ok(Json(service.top_product(Utc::now()).await?))
}

pub async fn get_peak_hours(State(state): State<AppState>) -> AppResult<Json<Vec<HourBucket>>> {
    let service = AnalyticsService::new(state.store.clone());
    Ok(Json(service.peak_hours(Utc::now()).await?))
}

pub async fn get_orders_by_status(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StatusCount>>> {
    let service = AnalyticsService::new(state.store.clone());
    Ok(Json(service.orders_by_status().await?))
}

/// Daily sales as JSON, or as a CSV download with `format=csv`
pub async fn get_daily_sales(
    State(state): State<AppState>,
    Query(query): Query<DailySalesQuery>,
) -> AppResult<Response> {
    let service = AnalyticsService::new(state.store.clone());
    let days = query.days.unwrap_or(30);

    if query.format.as_deref() == Some("csv") {
        let csv = service.daily_sales_csv(Utc::now(), days).await?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"ventas_diarias.csv\"",
                ),
            ],
            csv,
        )
            .into_response());
    }

    let rows = service.daily_sales(Utc::now(), days).await?;
    Ok(Json(rows).into_response())
}
