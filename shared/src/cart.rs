//! Shopping cart aggregate
//!
//! The cart lives in the customer's session and is sent with every checkout
//! preview and order request; nothing here is persisted by the backend.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Product;
use crate::types::Money;

/// The slice of a product the cart needs to price a line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub nombre: String,
    pub precio: Money,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            nombre: product.nombre.clone(),
            precio: product.precio,
        }
    }
}

/// A product and how many units of it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub producto: ProductSnapshot,
    pub cantidad: u32,
}

impl CartItem {
    pub fn new(producto: ProductSnapshot, cantidad: u32) -> Self {
        Self { producto, cantidad }
    }

    pub fn line_total(&self) -> Money {
        self.producto.precio * Money::from(self.cantidad)
    }
}

/// Serializable cart owned by the session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit, merging with an existing line for the same product
    pub fn add(&mut self, producto: ProductSnapshot) {
        match self.items.iter_mut().find(|i| i.producto.id == producto.id) {
            Some(item) => item.cantidad += 1,
            None => self.items.push(CartItem::new(producto, 1)),
        }
    }

    pub fn remove(&mut self, product_id: &Uuid) {
        self.items.retain(|i| &i.producto.id != product_id);
    }

    /// Set a line's quantity; zero removes the line
    pub fn update_quantity(&mut self, product_id: &Uuid, cantidad: u32) {
        if cantidad == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| &i.producto.id == product_id) {
            item.cantidad = cantidad;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.cantidad).sum()
    }
}
