//! WebAssembly module for the JM Restaurant storefront
//!
//! Provides client-side computation for:
//! - Cart totals and promotion discounts (same engine as the server)
//! - Order status labels and allowed transitions for the kitchen board
//! - Event banner countdowns
//!
//! Structured values cross the boundary as JSON strings; timestamps are
//! RFC 3339 strings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::{
    calculate_discount, countdown_text, validate_phone, Cart, DiscountOutcome, OrderStatus,
    OrderTotals, PricingPolicy, Promotion,
};

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
struct TotalsPreview {
    totals: OrderTotals,
    applied_promotions: Vec<Promotion>,
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp {}: {}", value, e))
}

fn parse_status(value: &str) -> Result<OrderStatus, String> {
    OrderStatus::from_str(value).ok_or_else(|| format!("Unknown order status: {}", value))
}

fn discount_for(
    cart_json: &str,
    promotions_json: &str,
    now: &str,
) -> Result<(Cart, DiscountOutcome), String> {
    let cart: Cart =
        serde_json::from_str(cart_json).map_err(|e| format!("Invalid cart JSON: {}", e))?;
    let promotions: Vec<Promotion> = serde_json::from_str(promotions_json)
        .map_err(|e| format!("Invalid promotions JSON: {}", e))?;
    let outcome =
        calculate_discount(&cart.items, &promotions, parse_time(now)?).map_err(|e| e.to_string())?;
    Ok((cart, outcome))
}

fn preview(
    cart_json: &str,
    promotions_json: &str,
    include_shipping: bool,
    now: &str,
) -> Result<String, String> {
    let (cart, outcome) = discount_for(cart_json, promotions_json, now)?;
    let totals = PricingPolicy::default()
        .calculate_totals(&cart.items, outcome.discount, include_shipping)
        .map_err(|e| e.to_string())?;
    serde_json::to_string(&TotalsPreview {
        totals,
        applied_promotions: outcome.applied_promotions,
    })
    .map_err(|e| e.to_string())
}

fn transitions(estado: &str) -> Result<String, String> {
    let allowed: Vec<&str> = parse_status(estado)?
        .allowed_transitions()
        .iter()
        .map(OrderStatus::as_str)
        .collect();
    serde_json::to_string(&allowed).map_err(|e| e.to_string())
}

fn countdown(fecha_fin: &str, now: &str) -> Result<String, String> {
    Ok(countdown_text(parse_time(fecha_fin)? - parse_time(now)?))
}

/// Totals and applied promotions for a cart, as JSON
#[wasm_bindgen(js_name = previewTotals)]
pub fn preview_totals(
    cart_json: &str,
    promotions_json: &str,
    include_shipping: bool,
    now: &str,
) -> Result<String, JsValue> {
    preview(cart_json, promotions_json, include_shipping, now).map_err(|e| JsValue::from_str(&e))
}

/// Stacked promotion discount for a cart, as JSON
#[wasm_bindgen(js_name = calculateDiscount)]
pub fn calculate_cart_discount(
    cart_json: &str,
    promotions_json: &str,
    now: &str,
) -> Result<String, JsValue> {
    discount_for(cart_json, promotions_json, now)
        .and_then(|(_, outcome)| serde_json::to_string(&outcome).map_err(|e| e.to_string()))
        .map_err(|e| JsValue::from_str(&e))
}

/// Next states reachable from `estado`, as a JSON array
#[wasm_bindgen(js_name = allowedTransitions)]
pub fn allowed_transitions(estado: &str) -> Result<String, JsValue> {
    transitions(estado).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen(js_name = canTransition)]
pub fn can_transition(from: &str, to: &str) -> bool {
    match (OrderStatus::from_str(from), OrderStatus::from_str(to)) {
        (Some(from), Some(to)) => from.can_transition_to(to),
        _ => false,
    }
}

/// Display label, or the raw value for an unknown state
#[wasm_bindgen(js_name = statusLabel)]
pub fn status_label(estado: &str) -> String {
    OrderStatus::from_str(estado)
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| estado.to_string())
}

#[wasm_bindgen(js_name = statusColor)]
pub fn status_color(estado: &str) -> String {
    OrderStatus::from_str(estado)
        .map(|s| s.color().to_string())
        .unwrap_or_else(|| "#6b7280".to_string())
}

/// Countdown text for the event banner
#[wasm_bindgen(js_name = eventCountdown)]
pub fn event_countdown(fecha_fin: &str, now: &str) -> Result<String, JsValue> {
    countdown(fecha_fin, now).map_err(|e| JsValue::from_str(&e))
}

/// Checkout phone check
#[wasm_bindgen(js_name = isValidPhone)]
pub fn is_valid_phone(telefono: &str) -> bool {
    validate_phone(telefono).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const NOW: &str = "2026-03-15T12:00:00.000Z";

    fn cart() -> String {
        json!({
            "items": [
                { "producto": { "id": "6f1c1d2e-0000-4000-8000-000000000001", "nombre": "Pizza", "precio": "10000" }, "cantidad": 2 },
                { "producto": { "id": "6f1c1d2e-0000-4000-8000-000000000002", "nombre": "Gaseosa", "precio": "3000" }, "cantidad": 1 }
            ]
        })
        .to_string()
    }

    #[test]
    fn test_preview_without_promotions() {
        let out: Value = serde_json::from_str(&preview(&cart(), "[]", true, NOW).unwrap()).unwrap();
        assert_eq!(out["totals"]["subtotal"], "23000");
        assert_eq!(out["totals"]["impuestos"], "1840");
        assert_eq!(out["totals"]["total"], "29840");
        assert_eq!(out["applied_promotions"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_bad_input_is_reported() {
        assert!(preview("not json", "[]", false, NOW).is_err());
        assert!(preview(&cart(), "[]", false, "yesterday").is_err());
        assert!(transitions("perdido").is_err());
    }

    #[test]
    fn test_transitions() {
        assert_eq!(transitions("nuevo").unwrap(), r#"["confirmado","cancelado"]"#);
        assert_eq!(transitions("entregado").unwrap(), "[]");
        assert!(can_transition("en_camino", "entregado"));
        assert!(!can_transition("entregado", "nuevo"));
        assert!(!can_transition("nuevo", "perdido"));
        assert_eq!(status_label("en_preparacion"), "En Preparación");
    }

    #[test]
    fn test_countdown() {
        assert_eq!(
            countdown("2026-03-17T15:30:00Z", NOW).unwrap(),
            "2d 3h 30m"
        );
        assert_eq!(countdown("2026-03-15T13:00:05Z", NOW).unwrap(), "1h 0m 5s");
        assert_eq!(countdown("2026-03-15T11:00:00Z", NOW).unwrap(), "Finalizado");
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("+57 300 123 4567"));
        assert!(!is_valid_phone("123"));
    }
}
