//! Shared types and models for the JM Restaurant ordering platform
//!
//! This crate contains the order state machine, the pricing engine and the
//! domain records shared between the backend and the storefront (via WASM).

pub mod cart;
pub mod models;
pub mod pricing;
pub mod types;
pub mod validation;

pub use cart::*;
pub use models::*;
pub use pricing::*;
pub use types::*;
pub use validation::*;
