//! Menu catalog models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Money;

/// Menu section (`categoria`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub nombre: String,
    pub orden: i32,
    pub visible: bool,
}

/// A dish or drink on the menu (`producto`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    pub precio: Money,
    pub categoria_id: Uuid,
    #[serde(default)]
    pub imagen_url: String,
    pub disponible: bool,
    pub destacado: bool,
    #[serde(default)]
    pub etiquetas: Vec<String>,
    pub stock: i32,
    #[serde(default)]
    pub ingredientes: Vec<String>,
    /// Variants and extras, free-form JSON
    #[serde(default)]
    pub opciones: serde_json::Value,
}

/// Stock at or below this level triggers a low-stock alert
pub const LOW_STOCK_THRESHOLD: i32 = 5;

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock > 0 && self.stock <= LOW_STOCK_THRESHOLD
    }
}
