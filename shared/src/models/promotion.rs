//! Promotion models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Money;

/// How a promotion computes its discount.
///
/// Stored as `{ "tipo": "porcentaje" | "monto_fijo" | "2x1", "valor": n }`.
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionKind {
    /// Percentage off the qualifying lines (`valor` = 0-100)
    Percentage { percent: Decimal },
    /// Flat amount off the cart, independent of quantities
    FixedAmount { amount: Money },
    /// One free unit for every two of the same product
    TwoForOne,
}

impl PromotionKind {
    pub fn tipo(&self) -> &'static str {
        match self {
            PromotionKind::Percentage { .. } => "porcentaje",
            PromotionKind::FixedAmount { .. } => "monto_fijo",
            PromotionKind::TwoForOne => "2x1",
        }
    }

    /// The stored `valor`. Always zero for 2x1.
    pub fn valor(&self) -> Decimal {
        match self {
            PromotionKind::Percentage { percent } => *percent,
            PromotionKind::FixedAmount { amount } => *amount,
            PromotionKind::TwoForOne => Decimal::ZERO,
        }
    }

    pub fn from_parts(tipo: &str, valor: Decimal) -> Option<Self> {
        match tipo {
            "porcentaje" => Some(PromotionKind::Percentage { percent: valor }),
            "monto_fijo" => Some(PromotionKind::FixedAmount { amount: valor }),
            "2x1" => Some(PromotionKind::TwoForOne),
            _ => None,
        }
    }
}

/// A time-windowed discount rule (`promocion`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PromotionRecord", into = "PromotionRecord")]
pub struct Promotion {
    pub id: Uuid,
    pub kind: PromotionKind,
    /// Empty means the promotion applies to every product
    pub productos_aplicables: Vec<Uuid>,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_fin: DateTime<Utc>,
    pub activa: bool,
}

impl Promotion {
    /// `activa && fecha_inicio <= now <= fecha_fin`
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.activa && self.fecha_inicio <= now && now <= self.fecha_fin
    }

    pub fn applies_to(&self, product_id: &Uuid) -> bool {
        self.productos_aplicables.is_empty() || self.productos_aplicables.contains(product_id)
    }

    /// Badge text shown next to the promotion in listings
    pub fn status_label(&self, now: DateTime<Utc>) -> &'static str {
        if self.is_active(now) {
            "Activa"
        } else {
            "Inactiva"
        }
    }
}

/// Flat document shape of a promotion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionRecord {
    pub id: Uuid,
    pub tipo: String,
    #[serde(default)]
    pub valor: Decimal,
    #[serde(default)]
    pub productos_aplicables: Vec<Uuid>,
    #[serde(with = "crate::types::timestamp")]
    pub fecha_inicio: DateTime<Utc>,
    #[serde(with = "crate::types::timestamp")]
    pub fecha_fin: DateTime<Utc>,
    pub activa: bool,
}

impl TryFrom<PromotionRecord> for Promotion {
    type Error = String;

    fn try_from(record: PromotionRecord) -> Result<Self, Self::Error> {
        let kind = PromotionKind::from_parts(&record.tipo, record.valor)
            .ok_or_else(|| format!("unknown promotion type: {}", record.tipo))?;
        Ok(Promotion {
            id: record.id,
            kind,
            productos_aplicables: record.productos_aplicables,
            fecha_inicio: record.fecha_inicio,
            fecha_fin: record.fecha_fin,
            activa: record.activa,
        })
    }
}

impl From<Promotion> for PromotionRecord {
    fn from(promotion: Promotion) -> Self {
        PromotionRecord {
            id: promotion.id,
            tipo: promotion.kind.tipo().to_string(),
            valor: promotion.kind.valor(),
            productos_aplicables: promotion.productos_aplicables,
            fecha_inicio: promotion.fecha_inicio,
            fecha_fin: promotion.fecha_fin,
            activa: promotion.activa,
        }
    }
}
