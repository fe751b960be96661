//! Pricing engine
//!
//! Turns a cart into billable totals and computes promotion discounts.
//! Everything here is pure: the caller passes the clock reading in.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::cart::CartItem;
use crate::models::{Promotion, PromotionKind};
use crate::types::{round_half_up, Money};

/// Default tax rate (8%)
pub fn default_tax_rate() -> Decimal {
    Decimal::new(8, 2)
}

/// Default flat shipping fee
pub fn default_shipping_fee() -> Money {
    Money::from(5000)
}

/// Malformed pricing input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("Quantity for product {product_id} must be positive")]
    NonPositiveQuantity { product_id: Uuid },

    #[error("Price for product {product_id} cannot be negative")]
    NegativePrice { product_id: Uuid },

    #[error("Discount cannot be negative: {0}")]
    NegativeDiscount(Decimal),
}

/// Billable totals of a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub impuestos: Money,
    pub envio: Money,
    pub descuento: Money,
    pub total: Money,
}

/// Result of applying promotions to a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountOutcome {
    pub discount: Money,
    pub applied_promotions: Vec<Promotion>,
}

/// Tax rate and shipping fee in force
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub tax_rate: Decimal,
    pub shipping_fee: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            shipping_fee: default_shipping_fee(),
        }
    }
}

impl PricingPolicy {
    pub fn new(tax_rate: Decimal, shipping_fee: Money) -> Self {
        Self {
            tax_rate,
            shipping_fee,
        }
    }

    /// Compute subtotal, tax, shipping and total.
    ///
    /// The discount is taken off before tax; tax is rounded half up to a
    /// whole unit and nothing else is rounded. The discount is not capped at
    /// the subtotal.
    pub fn calculate_totals(
        &self,
        items: &[CartItem],
        discount: Money,
        include_shipping: bool,
    ) -> Result<OrderTotals, PricingError> {
        validate_items(items)?;
        if discount < Decimal::ZERO {
            return Err(PricingError::NegativeDiscount(discount));
        }

        let subtotal: Money = items.iter().map(CartItem::line_total).sum();
        let impuestos = round_half_up((subtotal - discount) * self.tax_rate);
        let envio = if include_shipping {
            self.shipping_fee
        } else {
            Money::ZERO
        };
        let total = subtotal - discount + impuestos + envio;

        Ok(OrderTotals {
            subtotal: subtotal.normalize(),
            impuestos: impuestos.normalize(),
            envio: envio.normalize(),
            descuento: discount.normalize(),
            total: total.normalize(),
        })
    }
}

/// [`PricingPolicy::calculate_totals`] with the default policy
pub fn calculate_totals(
    items: &[CartItem],
    discount: Money,
    include_shipping: bool,
) -> Result<OrderTotals, PricingError> {
    PricingPolicy::default().calculate_totals(items, discount, include_shipping)
}

/// Sum the discounts of every promotion active at `now` that touches the cart.
///
/// Promotions stack without limit or priority. A promotion that is inactive,
/// outside its window, matches no line, or yields nothing is not applied.
pub fn calculate_discount(
    items: &[CartItem],
    promotions: &[Promotion],
    now: DateTime<Utc>,
) -> Result<DiscountOutcome, PricingError> {
    validate_items(items)?;

    let mut total = Money::ZERO;
    let mut applied = Vec::new();

    for promotion in promotions {
        if !promotion.is_active(now) {
            continue;
        }

        let qualifying: Vec<&CartItem> = items
            .iter()
            .filter(|item| promotion.applies_to(&item.producto.id))
            .collect();
        if qualifying.is_empty() {
            continue;
        }

        let discount = promotion_discount(&promotion.kind, &qualifying);
        if discount > Money::ZERO {
            total += discount;
            applied.push(promotion.clone());
        }
    }

    Ok(DiscountOutcome {
        discount: total.normalize(),
        applied_promotions: applied,
    })
}

fn promotion_discount(kind: &PromotionKind, qualifying: &[&CartItem]) -> Money {
    match kind {
        PromotionKind::Percentage { percent } => {
            let base: Money = qualifying.iter().map(|item| item.line_total()).sum();
            base * (*percent / Decimal::from(100))
        }
        PromotionKind::FixedAmount { amount } => *amount,
        // Pairs never span two products
        PromotionKind::TwoForOne => qualifying
            .iter()
            .map(|item| Money::from(item.cantidad / 2) * item.producto.precio)
            .sum(),
    }
}

fn validate_items(items: &[CartItem]) -> Result<(), PricingError> {
    for item in items {
        if item.cantidad == 0 {
            return Err(PricingError::NonPositiveQuantity {
                product_id: item.producto.id,
            });
        }
        if item.producto.precio < Decimal::ZERO {
            return Err(PricingError::NegativePrice {
                product_id: item.producto.id,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::ProductSnapshot;
    use chrono::Duration;

    fn item(precio: i64, cantidad: u32) -> CartItem {
        CartItem::new(
            ProductSnapshot {
                id: Uuid::new_v4(),
                nombre: "Item".to_string(),
                precio: Money::from(precio),
            },
            cantidad,
        )
    }

    fn promo(kind: PromotionKind, products: Vec<Uuid>) -> Promotion {
        let now = Utc::now();
        Promotion {
            id: Uuid::new_v4(),
            kind,
            productos_aplicables: products,
            fecha_inicio: now - Duration::days(1),
            fecha_fin: now + Duration::days(1),
            activa: true,
        }
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let totals = calculate_totals(&[], Money::ZERO, false).unwrap();
        assert_eq!(totals.total, Money::ZERO);
    }

    #[test]
    fn test_percentage_only_on_qualifying_lines() {
        let a = item(10000, 1);
        let b = item(4000, 1);
        let p = promo(
            PromotionKind::Percentage {
                percent: Decimal::from(10),
            },
            vec![a.producto.id],
        );
        let outcome = calculate_discount(&[a, b], &[p], Utc::now()).unwrap();
        assert_eq!(outcome.discount, Money::from(1000));
    }

    #[test]
    fn test_fixed_amount_ignores_quantity() {
        let p = promo(
            PromotionKind::FixedAmount {
                amount: Money::from(1500),
            },
            vec![],
        );
        let outcome = calculate_discount(&[item(100, 9)], &[p], Utc::now()).unwrap();
        assert_eq!(outcome.discount, Money::from(1500));
    }

    #[test]
    fn test_promotion_without_matching_line_is_skipped() {
        let p = promo(PromotionKind::TwoForOne, vec![Uuid::new_v4()]);
        let outcome = calculate_discount(&[item(1000, 4)], &[p], Utc::now()).unwrap();
        assert_eq!(outcome.discount, Money::ZERO);
        assert!(outcome.applied_promotions.is_empty());
    }

    #[test]
    fn test_two_for_one_single_unit_yields_nothing() {
        let p = promo(PromotionKind::TwoForOne, vec![]);
        let outcome = calculate_discount(&[item(1000, 1)], &[p], Utc::now()).unwrap();
        assert!(outcome.applied_promotions.is_empty());
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let err = calculate_totals(&[item(1000, 0)], Money::ZERO, false).unwrap_err();
        assert!(matches!(err, PricingError::NonPositiveQuantity { .. }));
    }

    #[test]
    fn test_rejects_negative_price_and_discount() {
        let err = calculate_totals(&[item(-1, 1)], Money::ZERO, false).unwrap_err();
        assert!(matches!(err, PricingError::NegativePrice { .. }));

        let err = calculate_totals(&[item(1, 1)], Money::from(-5), false).unwrap_err();
        assert_eq!(err, PricingError::NegativeDiscount(Money::from(-5)));
    }

    #[test]
    fn test_custom_policy() {
        let policy = PricingPolicy::new(Decimal::new(19, 2), Money::from(3000));
        let totals = policy
            .calculate_totals(&[item(1000, 1)], Money::ZERO, true)
            .unwrap();
        assert_eq!(totals.impuestos, Money::from(190));
        assert_eq!(totals.total, Money::from(4190));
    }
}
