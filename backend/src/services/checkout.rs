//! Checkout: price a session cart against the live catalog and active
//! promotions, then place the order.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{
    calculate_discount, check_phone, Cart, CartItem, Order, OrderTotals, PaymentMethod,
    ProductSnapshot, Promotion,
};
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::notification::NotificationService;
use crate::services::order::{NewOrder, OrderService};
use crate::services::product::ProductService;
use crate::services::promotion::PromotionService;
use crate::store::SharedStore;

/// Checkout service
#[derive(Clone)]
pub struct CheckoutService {
    orders: OrderService,
    products: ProductService,
    promotions: PromotionService,
}

/// Customer details entered at checkout
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutForm {
    #[validate(length(min = 1, message = "El nombre es requerido"))]
    pub nombre: String,
    #[validate(length(min = 7, message = "Teléfono inválido"), custom = "check_phone")]
    pub telefono: String,
    #[serde(default)]
    pub direccion: Option<String>,
    pub metodo_pago: PaymentMethod,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notas: Option<String>,
}

impl CheckoutForm {
    /// Shipping is charged only for delivery orders
    pub fn include_shipping(&self) -> bool {
        self.direccion
            .as_deref()
            .map(|d| !d.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Totals shown before the customer confirms
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutPreview {
    pub totals: OrderTotals,
    pub applied_promotions: Vec<Promotion>,
}

/// A placed order and the promotions that priced it
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub applied_promotions: Vec<Promotion>,
}

impl CheckoutService {
    /// Create a new CheckoutService instance
    pub fn new(store: SharedStore, config: &Config) -> Self {
        let notifications = NotificationService::new(store.clone(), &config.notifications);
        Self {
            orders: OrderService::new(store.clone(), config),
            products: ProductService::new(store.clone(), notifications),
            promotions: PromotionService::new(store),
        }
    }

    pub async fn preview(&self, cart: &Cart, include_shipping: bool) -> AppResult<CheckoutPreview> {
        let items = self.reprice(cart).await?;
        let promotions = self.promotions.list_active(Utc::now()).await?;
        let outcome = calculate_discount(&items, &promotions, Utc::now())?;
        let totals =
            self.orders
                .pricing()
                .calculate_totals(&items, outcome.discount, include_shipping)?;

        Ok(CheckoutPreview {
            totals,
            applied_promotions: outcome.applied_promotions,
        })
    }

    /// Validate the form, price the cart and create the order
    pub async fn checkout(
        &self,
        cart: &Cart,
        form: CheckoutForm,
        cliente_id: Option<String>,
    ) -> AppResult<CheckoutReceipt> {
        form.validate()?;

        let items = self.reprice(cart).await?;
        let now = Utc::now();
        let promotions = self.promotions.list_active(now).await?;
        let outcome = calculate_discount(&items, &promotions, now)?;

        let include_shipping = form.include_shipping();
        let order = self
            .orders
            .create_order(NewOrder {
                items,
                discount: outcome.discount,
                direccion_entrega: form.direccion,
                metodo_pago: form.metodo_pago,
                cliente_id,
                include_shipping,
            })
            .await?;

        tracing::info!(
            order_id = %order.id,
            promotions = outcome.applied_promotions.len(),
            "Checkout completed for {}",
            form.nombre
        );

        Ok(CheckoutReceipt {
            order,
            applied_promotions: outcome.applied_promotions,
        })
    }

    /// Replace each line's snapshot with the catalog's current name and price.
    /// The session cart is never trusted for prices.
    async fn reprice(&self, cart: &Cart) -> AppResult<Vec<CartItem>> {
        if cart.is_empty() {
            return Err(AppError::invalid_field(
                "items",
                "The cart is empty",
                "El carrito está vacío",
            ));
        }

        // One line per distinct product, in first-seen order
        let mut lines: Vec<(Uuid, u32)> = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            match lines.iter_mut().find(|(id, _)| *id == line.producto.id) {
                Some((_, cantidad)) => {
                    *cantidad = cantidad.checked_add(line.cantidad).ok_or_else(|| {
                        AppError::invalid_field(
                            "items",
                            "Quantity is too large",
                            "La cantidad es demasiado grande",
                        )
                    })?;
                }
                None => lines.push((line.producto.id, line.cantidad)),
            }
        }

        let mut items = Vec::with_capacity(lines.len());
        for (producto_id, cantidad) in lines {
            let product = self.products.get(producto_id).await?;
            if !product.disponible {
                return Err(AppError::Validation {
                    field: "items".to_string(),
                    message: format!("{} is not available", product.nombre),
                    message_es: format!("{} no está disponible", product.nombre),
                });
            }
            items.push(CartItem::new(ProductSnapshot::from(&product), cantidad));
        }
        Ok(items)
    }
}
