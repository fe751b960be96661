//! Route definitions for the JM Restaurant API

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, require_admin},
    AppState,
};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Storefront (public)
        .nest("/menu", menu_routes())
        .route("/promotions/active", get(handlers::list_active_promotions))
        .route("/events/active", get(handlers::get_active_event))
        .route("/settings", get(handlers::get_settings))
        .route("/checkout/preview", post(handlers::preview_checkout))
        .route("/checkout", post(handlers::submit_checkout))
        .route("/orders/:order_id/tracking", get(handlers::track_order))
        // Signed-in customers
        .nest("/me", customer_routes(state.clone()))
        // Back-office
        .nest("/admin", admin_routes(state))
}

/// Public menu routes
fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(handlers::list_menu_categories))
        .route("/products", get(handlers::list_menu_products))
        .route("/products/:product_id", get(handlers::get_menu_product))
        .route("/featured", get(handlers::list_featured_products))
}

/// Customer routes (protected)
fn customer_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/orders", get(handlers::list_my_orders))
        .route("/favorites", get(handlers::list_favorites))
        .route(
            "/favorites/:product_id",
            get(handlers::get_favorite_status).post(handlers::toggle_favorite),
        )
        .route("/notifications", get(handlers::get_notifications))
        .route("/notifications/unread-count", get(handlers::get_unread_count))
        .route(
            "/notifications/read-all",
            post(handlers::mark_all_notifications_read),
        )
        .route(
            "/notifications/:notification_id/read",
            post(handlers::mark_notification_read),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Back-office routes (protected, admin role)
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/orders", admin_order_routes())
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/promotions", promotion_routes())
        .nest("/events", event_routes())
        .route("/settings", put(handlers::update_settings))
        .route("/notifications", post(handlers::send_notification))
        .nest("/analytics", analytics_routes())
        // Layers run bottom-up: authenticate, then check the role
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn admin_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders))
        .route("/board", get(handlers::get_order_board))
        .route("/changes", get(handlers::list_order_changes))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/items", get(handlers::list_order_items))
        .route("/:order_id/history", get(handlers::list_order_history))
        .route("/:order_id/status", patch(handlers::transition_order))
        .route("/:order_id/audit", get(handlers::audit_order))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/reorder", put(handlers::reorder_categories))
        .route(
            "/:category_id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/:category_id/visibility",
            post(handlers::toggle_category_visibility),
        )
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            put(handlers::update_product).delete(handlers::delete_product),
        )
        .route(
            "/:product_id/availability",
            post(handlers::toggle_product_availability),
        )
        .route("/:product_id/featured", post(handlers::toggle_product_featured))
        .route("/:product_id/stock", put(handlers::update_product_stock))
}

fn promotion_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_promotions).post(handlers::create_promotion),
        )
        .route(
            "/:promotion_id",
            get(handlers::get_promotion)
                .put(handlers::update_promotion)
                .delete(handlers::delete_promotion),
        )
        .route("/:promotion_id/toggle", post(handlers::toggle_promotion))
}

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_events).post(handlers::create_event))
        .route(
            "/:event_id",
            get(handlers::get_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .route("/:event_id/toggle", post(handlers::toggle_event))
}

fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/kpis", get(handlers::get_kpis))
        .route("/top-product", get(handlers::get_top_product))
        .route("/peak-hours", get(handlers::get_peak_hours))
        .route("/daily-sales", get(handlers::get_daily_sales))
        .route("/orders-by-status", get(handlers::get_orders_by_status))
}
