//! In-app notification models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification type (`tipo`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PedidoNuevo,
    EstadoPedido,
    StockBajo,
    General,
}

/// Delivery channel. Internal notifications are always stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Internal,
    Email,
    Push,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Internal => "internal",
            NotificationChannel::Email => "email",
            NotificationChannel::Push => "push",
        }
    }
}

/// A stored notification (`notificacion`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub usuario_id: String,
    pub tipo: NotificationKind,
    pub titulo: String,
    pub mensaje: String,
    pub leida: bool,
    #[serde(with = "crate::types::timestamp")]
    pub fecha: DateTime<Utc>,
}
