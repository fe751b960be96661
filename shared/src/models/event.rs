//! Themed storefront events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A time-boxed storefront theme (`evento`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub imagen: String,
    pub color_tema: String,
    #[serde(with = "crate::types::timestamp")]
    pub fecha_inicio: DateTime<Utc>,
    #[serde(with = "crate::types::timestamp")]
    pub fecha_fin: DateTime<Utc>,
    pub activo: bool,
}

impl Event {
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.activo && self.fecha_inicio <= now && now <= self.fecha_fin
    }

    /// Countdown shown on the event banner
    pub fn countdown(&self, now: DateTime<Utc>) -> String {
        countdown_text(self.fecha_fin - now)
    }
}

/// `"2d 3h 30m"`, `"1h 0m 5s"` under a day, `"Finalizado"` once elapsed
pub fn countdown_text(remaining: chrono::Duration) -> String {
    if remaining <= chrono::Duration::zero() {
        return "Finalizado".to_string();
    }

    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;
    let minutes = remaining.num_minutes() % 60;
    let seconds = remaining.num_seconds() % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else {
        format!("{}h {}m {}s", hours, minutes, seconds)
    }
}
