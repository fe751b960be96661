//! Business logic services for the JM Restaurant ordering platform

pub mod analytics;
pub mod category;
pub mod checkout;
pub mod event;
pub mod favorite;
pub mod notification;
pub mod order;
pub mod order_number;
pub mod product;
pub mod promotion;
pub mod settings;

pub use analytics::AnalyticsService;
pub use category::CategoryService;
pub use checkout::CheckoutService;
pub use event::EventService;
pub use favorite::FavoriteService;
pub use notification::NotificationService;
pub use order::OrderService;
pub use product::ProductService;
pub use promotion::PromotionService;
pub use settings::SettingsService;
