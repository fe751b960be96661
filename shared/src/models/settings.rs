//! Restaurant-wide settings

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Singleton settings document (`configuracion`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RestaurantSettings {
    pub id: Uuid,
    pub nombre: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub logo_url: Option<String>,
    /// Opening hours, free-form JSON
    pub horarios: Option<serde_json::Value>,
    /// Social links, free-form JSON
    pub redes_sociales: Option<serde_json::Value>,
}
