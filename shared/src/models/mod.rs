//! Domain models for the JM Restaurant ordering platform

mod catalog;
mod event;
mod favorite;
mod notification;
mod order;
mod promotion;
mod settings;

pub use catalog::*;
pub use event::*;
pub use favorite::*;
pub use notification::*;
pub use order::*;
pub use promotion::*;
pub use settings::*;
