//! Order models and the order status state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

use crate::types::Money;

/// Lifecycle state of an order (`estado`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Nuevo,
    Confirmado,
    EnPreparacion,
    EnCamino,
    Entregado,
    Cancelado,
}

impl OrderStatus {
    /// Every state, in workflow order
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Nuevo,
        OrderStatus::Confirmado,
        OrderStatus::EnPreparacion,
        OrderStatus::EnCamino,
        OrderStatus::Entregado,
        OrderStatus::Cancelado,
    ];

    /// Columns shown on the operations board. Cancelled orders drop off the board.
    pub const BOARD_COLUMNS: [OrderStatus; 5] = [
        OrderStatus::Nuevo,
        OrderStatus::Confirmado,
        OrderStatus::EnPreparacion,
        OrderStatus::EnCamino,
        OrderStatus::Entregado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Nuevo => "nuevo",
            OrderStatus::Confirmado => "confirmado",
            OrderStatus::EnPreparacion => "en_preparacion",
            OrderStatus::EnCamino => "en_camino",
            OrderStatus::Entregado => "entregado",
            OrderStatus::Cancelado => "cancelado",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "nuevo" => Some(OrderStatus::Nuevo),
            "confirmado" => Some(OrderStatus::Confirmado),
            "en_preparacion" => Some(OrderStatus::EnPreparacion),
            "en_camino" => Some(OrderStatus::EnCamino),
            "entregado" => Some(OrderStatus::Entregado),
            "cancelado" => Some(OrderStatus::Cancelado),
            _ => None,
        }
    }

    /// Human-readable label used in notifications and the board
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Nuevo => "Nuevo",
            OrderStatus::Confirmado => "Confirmado",
            OrderStatus::EnPreparacion => "En Preparación",
            OrderStatus::EnCamino => "En Camino",
            OrderStatus::Entregado => "Entregado",
            OrderStatus::Cancelado => "Cancelado",
        }
    }

    /// Badge colour for the board
    pub fn color(&self) -> &'static str {
        match self {
            OrderStatus::Nuevo => "#3b82f6",
            OrderStatus::Confirmado => "#8b5cf6",
            OrderStatus::EnPreparacion => "#f59e0b",
            OrderStatus::EnCamino => "#06b6d4",
            OrderStatus::Entregado => "#10b981",
            OrderStatus::Cancelado => "#ef4444",
        }
    }

    /// States reachable in one step.
    ///
    /// Cancellation is only possible before the order leaves the kitchen:
    /// an order that is `en_camino` can only be delivered.
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Nuevo => &[OrderStatus::Confirmado, OrderStatus::Cancelado],
            OrderStatus::Confirmado => &[OrderStatus::EnPreparacion, OrderStatus::Cancelado],
            OrderStatus::EnPreparacion => &[OrderStatus::EnCamino, OrderStatus::Cancelado],
            OrderStatus::EnCamino => &[OrderStatus::Entregado],
            OrderStatus::Entregado | OrderStatus::Cancelado => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Validate a single step of the state machine
    pub fn validate_transition(&self, next: OrderStatus) -> Result<(), TransitionError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(TransitionError {
                from: *self,
                to: next,
                allowed: self.allowed_transitions().to_vec(),
            })
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected state change. Carries the permitted destinations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid transition: {from} → {to}. Allowed: {}", format_allowed(.allowed))]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub allowed: Vec<OrderStatus>,
}

fn format_allowed(allowed: &[OrderStatus]) -> String {
    if allowed.is_empty() {
        return "none".to_string();
    }
    allowed
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Payment method chosen at checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Efectivo,
    Transferencia,
    Tarjeta,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Efectivo => "efectivo",
            PaymentMethod::Transferencia => "transferencia",
            PaymentMethod::Tarjeta => "tarjeta",
        }
    }
}

/// A placed order (`pedido`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub numero_pedido: String,
    pub cliente_id: Option<String>,
    pub subtotal: Money,
    pub impuestos: Money,
    pub envio: Money,
    pub descuento: Money,
    pub total: Money,
    pub estado: OrderStatus,
    pub direccion_entrega: Option<String>,
    pub metodo_pago: PaymentMethod,
    #[serde(with = "crate::types::timestamp")]
    pub fecha_creacion: DateTime<Utc>,
    #[serde(with = "crate::types::timestamp")]
    pub fecha_actualizacion: DateTime<Utc>,
}

impl Order {
    /// `total = subtotal - descuento + impuestos + envio`
    pub fn totals_consistent(&self) -> bool {
        self.total == self.subtotal - self.descuento + self.impuestos + self.envio
    }
}

/// Line item frozen at checkout time (`pedido_item`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub pedido_id: Uuid,
    pub producto_id: Uuid,
    pub cantidad: u32,
    pub precio_unitario: Money,
    pub total_item: Money,
}

/// Append-only audit entry (`historial_estado`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub pedido_id: Uuid,
    /// `None` for the creation entry; stored as an empty string
    #[serde(with = "previous_status")]
    pub estado_anterior: Option<OrderStatus>,
    pub estado_nuevo: OrderStatus,
    #[serde(with = "crate::types::timestamp")]
    pub fecha: DateTime<Utc>,
    pub cambiado_por: String,
}

mod previous_status {
    use super::*;

    pub fn serialize<S>(value: &Option<OrderStatus>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.map(|s| s.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OrderStatus>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        OrderStatus::from_str(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown order status: {}", raw)))
    }
}

/// Problems found while replaying an order's history
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history is empty")]
    Empty,

    #[error("first entry must be '' → nuevo")]
    BadStart,

    #[error("entry {index} starts from {found:?} but the order was {expected}")]
    Discontinuous {
        index: usize,
        expected: OrderStatus,
        found: Option<OrderStatus>,
    },

    #[error("entry {index}: {source}")]
    IllegalStep {
        index: usize,
        #[source]
        source: TransitionError,
    },
}

/// Replay history entries (ordered by `fecha`) through the state machine.
///
/// Returns the state the history ends in.
pub fn replay_history(entries: &[StatusHistoryEntry]) -> Result<OrderStatus, HistoryError> {
    let mut sorted: Vec<&StatusHistoryEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.fecha);

    let first = sorted.first().ok_or(HistoryError::Empty)?;
    if first.estado_anterior.is_some() || first.estado_nuevo != OrderStatus::Nuevo {
        return Err(HistoryError::BadStart);
    }

    let mut current = OrderStatus::Nuevo;
    for (index, entry) in sorted.iter().enumerate().skip(1) {
        if entry.estado_anterior != Some(current) {
            return Err(HistoryError::Discontinuous {
                index,
                expected: current,
                found: entry.estado_anterior,
            });
        }
        current
            .validate_transition(entry.estado_nuevo)
            .map_err(|source| HistoryError::IllegalStep { index, source })?;
        current = entry.estado_nuevo;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(prev: Option<OrderStatus>, next: OrderStatus, offset_secs: i64) -> StatusHistoryEntry {
        StatusHistoryEntry {
            id: Uuid::new_v4(),
            pedido_id: Uuid::nil(),
            estado_anterior: prev,
            estado_nuevo: next,
            fecha: Utc::now() + Duration::seconds(offset_secs),
            cambiado_por: "system".to_string(),
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_str("pagado"), None);
    }

    #[test]
    fn test_serde_names_match_store_values() {
        let json = serde_json::to_string(&OrderStatus::EnPreparacion).unwrap();
        assert_eq!(json, "\"en_preparacion\"");
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Entregado.is_terminal());
        assert!(OrderStatus::Cancelado.is_terminal());
        assert!(!OrderStatus::EnCamino.is_terminal());
    }

    #[test]
    fn test_cannot_cancel_once_out_for_delivery() {
        let err = OrderStatus::EnCamino
            .validate_transition(OrderStatus::Cancelado)
            .unwrap_err();
        assert_eq!(err.allowed, vec![OrderStatus::Entregado]);
        assert_eq!(
            err.to_string(),
            "Invalid transition: en_camino → cancelado. Allowed: entregado"
        );
    }

    #[test]
    fn test_history_entry_serializes_empty_previous_state() {
        let e = entry(None, OrderStatus::Nuevo, 0);
        let value = serde_json::to_value(&e).unwrap();
        assert_eq!(value["estado_anterior"], "");
        let back: StatusHistoryEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back.estado_anterior, None);
    }

    #[test]
    fn test_replay_valid_history() {
        let entries = vec![
            entry(Some(OrderStatus::Nuevo), OrderStatus::Confirmado, 10),
            entry(None, OrderStatus::Nuevo, 0),
            entry(Some(OrderStatus::Confirmado), OrderStatus::Cancelado, 20),
        ];
        assert_eq!(replay_history(&entries), Ok(OrderStatus::Cancelado));
    }

    #[test]
    fn test_replay_rejects_skipped_state() {
        let entries = vec![
            entry(None, OrderStatus::Nuevo, 0),
            entry(Some(OrderStatus::Nuevo), OrderStatus::EnCamino, 10),
        ];
        assert!(matches!(
            replay_history(&entries),
            Err(HistoryError::IllegalStep { index: 1, .. })
        ));
    }

    #[test]
    fn test_replay_rejects_gap() {
        let entries = vec![
            entry(None, OrderStatus::Nuevo, 0),
            entry(Some(OrderStatus::Confirmado), OrderStatus::EnPreparacion, 10),
        ];
        assert!(matches!(
            replay_history(&entries),
            Err(HistoryError::Discontinuous { .. })
        ));
    }

    #[test]
    fn test_replay_requires_creation_entry() {
        assert_eq!(replay_history(&[]), Err(HistoryError::Empty));
        let entries = vec![entry(Some(OrderStatus::Nuevo), OrderStatus::Confirmado, 0)];
        assert_eq!(replay_history(&entries), Err(HistoryError::BadStart));
    }
}
