//! Configuration management for the JM Restaurant platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with JM_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::PricingPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Document store selection
    pub store: StoreConfig,

    /// Database configuration (used by the postgres store)
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Tax and shipping
    pub pricing: PricingConfig,

    /// Order lifecycle settings
    pub orders: OrdersConfig,

    /// Kitchen board settings
    pub board: BoardConfig,

    /// Notification delivery
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for verifying JWT tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    pub tax_rate: Decimal,
    pub shipping_fee: Decimal,
}

impl PricingConfig {
    pub fn policy(&self) -> PricingPolicy {
        PricingPolicy::new(self.tax_rate, self.shipping_fee)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrdersConfig {
    /// Undo earlier writes when order creation fails partway
    pub compensate_partial_failures: bool,

    /// Attempts at drawing an unused order number
    pub order_number_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    /// Suggested client polling interval
    pub refresh_interval_secs: u64,

    /// Orders fetched per board column
    pub fetch_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    /// Recipient of new-order and low-stock alerts
    pub admin_user_id: String,

    /// Relay for email and push deliveries
    pub webhook_url: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("JM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("store.backend", "memory")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.secret", "development-secret-key")?
            .set_default("pricing.tax_rate", "0.08")?
            .set_default("pricing.shipping_fee", "5000")?
            .set_default("orders.compensate_partial_failures", true)?
            .set_default("orders.order_number_attempts", 5)?
            .set_default("board.refresh_interval_secs", 15)?
            .set_default("board.fetch_limit", 200)?
            .set_default("notifications.admin_user_id", "admin")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (JM_ prefix)
            .add_source(
                Environment::with_prefix("JM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Defaults without touching files or the environment
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            store: StoreConfig {
                backend: StoreBackend::Memory,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                min_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
            },
            pricing: PricingConfig {
                tax_rate: shared::pricing::default_tax_rate(),
                shipping_fee: shared::pricing::default_shipping_fee(),
            },
            orders: OrdersConfig {
                compensate_partial_failures: true,
                order_number_attempts: 5,
            },
            board: BoardConfig {
                refresh_interval_secs: 15,
                fetch_limit: 200,
            },
            notifications: NotificationsConfig {
                admin_user_id: "admin".to_string(),
                webhook_url: None,
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
