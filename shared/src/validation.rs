//! Validation utilities for the JM Restaurant platform
//!
//! Plain checks return `Result<(), &'static str>`; the `check_*` wrappers
//! adapt them to `validator` custom rules for input structs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use validator::ValidationError;

// ============================================================================
// Money
// ============================================================================

/// Validate that an amount is zero or more
pub fn validate_non_negative(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

/// Validate that a price is strictly positive
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be positive");
    }
    Ok(())
}

/// Validate a percentage discount value (0-100)
pub fn validate_percentage(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO || value > Decimal::from(100) {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

// ============================================================================
// Schedules
// ============================================================================

/// Validate that a window does not end before it starts
pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), &'static str> {
    if end < start {
        return Err("End date must not be before start date");
    }
    Ok(())
}

// ============================================================================
// Contact details
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a phone number: at least 7 digits, optional separators and `+`
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-' || c == '+' || c == '(' || c == ')')
    {
        return Err("Phone number contains invalid characters");
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 7 {
        return Err("Phone number must have at least 7 digits");
    }
    Ok(())
}

/// Validate a `#rrggbb` theme colour
pub fn validate_hex_color(color: &str) -> Result<(), &'static str> {
    let hex = color.strip_prefix('#').ok_or("Color must start with #")?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("Color must be #rrggbb");
    }
    Ok(())
}

// ============================================================================
// validator adapters
// ============================================================================

fn to_validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn check_price(price: &Decimal) -> Result<(), ValidationError> {
    validate_price(*price).map_err(|m| to_validation_error("price", m))
}

pub fn check_non_negative(amount: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(*amount).map_err(|m| to_validation_error("non_negative", m))
}

pub fn check_phone(phone: &str) -> Result<(), ValidationError> {
    validate_phone(phone).map_err(|m| to_validation_error("phone", m))
}

pub fn check_hex_color(color: &str) -> Result<(), ValidationError> {
    validate_hex_color(color).map_err(|m| to_validation_error("hex_color", m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Decimal::from(1)).is_ok());
        assert!(validate_price(Decimal::ZERO).is_err());
        assert!(validate_price(Decimal::from(-100)).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(Decimal::ZERO).is_ok());
        assert!(validate_percentage(Decimal::from(100)).is_ok());
        assert!(validate_percentage(Decimal::new(1005, 1)).is_err());
        assert!(validate_percentage(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_window() {
        let now = Utc::now();
        assert!(validate_window(now, now).is_ok());
        assert!(validate_window(now, now + Duration::days(3)).is_ok());
        assert!(validate_window(now, now - Duration::seconds(1)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("admin@jm.com").is_ok());
        assert!(validate_email("admin").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("3001234567").is_ok());
        assert!(validate_phone("+57 300-123-4567").is_ok());
        assert!(validate_phone("123456").is_err());
        assert!(validate_phone("300abc4567").is_err());
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("#ff6b35").is_ok());
        assert!(validate_hex_color("ff6b35").is_err());
        assert!(validate_hex_color("#ff6b3").is_err());
        assert!(validate_hex_color("#gg6b35").is_err());
    }

    #[test]
    fn test_check_adapters_carry_message() {
        let err = check_price(&Decimal::ZERO).unwrap_err();
        assert_eq!(err.code, "price");
        assert_eq!(err.message.as_deref(), Some("Price must be positive"));
    }
}
