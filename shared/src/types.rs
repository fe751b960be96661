//! Common types used across the platform

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

/// Monetary amount in the restaurant's currency unit
pub type Money = Decimal;

/// Render a timestamp the way it is stored: RFC 3339, UTC, millisecond precision.
///
/// The width is fixed so stored strings sort chronologically.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for [`DateTime<Utc>`] fields stored as fixed-width strings
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Round half up to a whole unit, matching the storefront's rounding primitive.
///
/// `-2.5` rounds to `-2`, `2.5` rounds to `3`.
pub fn round_half_up(value: Decimal) -> Decimal {
    (value + Decimal::new(5, 1)).floor()
}
