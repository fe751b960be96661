//! HTTP handlers for the JM Restaurant API

pub mod analytics;
pub mod checkout;
pub mod event;
pub mod favorite;
pub mod health;
pub mod menu;
pub mod notification;
pub mod order;
pub mod promotion;
pub mod settings;

pub use analytics::*;
pub use checkout::*;
pub use event::*;
pub use favorite::*;
pub use health::*;
pub use menu::*;
pub use notification::*;
pub use order::*;
pub use promotion::*;
pub use settings::*;
