//! Customer favorites

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product bookmarked by a customer (`favorito`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    pub id: Uuid,
    pub cliente_id: String,
    pub producto_id: Uuid,
}
