//! Human-readable order numbers: `JM<YY><MM>-<5 base36 chars>`

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

const SUFFIX_LEN: usize = 5;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Month prefix, e.g. `JM2605` for May 2026
pub fn order_number_prefix(now: DateTime<Utc>) -> String {
    format!("JM{:02}{:02}", now.year() % 100, now.month())
}

pub fn format_order_number(now: DateTime<Utc>, suffix: &str) -> String {
    format!("{}-{}", order_number_prefix(now), suffix)
}

/// Random 5-character base36 suffix
pub fn random_suffix() -> String {
    let mut n = Uuid::new_v4().as_u128() % 36u128.pow(SUFFIX_LEN as u32);
    let mut chars = [b'0'; SUFFIX_LEN];
    for slot in chars.iter_mut().rev() {
        *slot = BASE36[(n % 36) as usize];
        n /= 36;
    }
    chars.iter().map(|&c| c as char).collect()
}

pub fn is_valid_order_number(candidate: &str) -> bool {
    let Some((prefix, suffix)) = candidate.split_once('-') else {
        return false;
    };
    prefix.len() == 6
        && prefix.starts_with("JM")
        && prefix[2..].chars().all(|c| c.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_prefix_pads_month() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(order_number_prefix(now), "JM2605");
        assert_eq!(format_order_number(now, "A1B2C"), "JM2605-A1B2C");
    }

    #[test]
    fn test_random_suffix_is_base36() {
        for _ in 0..200 {
            let suffix = random_suffix();
            assert_eq!(suffix.len(), 5);
            assert!(is_valid_order_number(&format!("JM2612-{}", suffix)));
        }
    }

    #[test]
    fn test_rejects_malformed_numbers() {
        assert!(!is_valid_order_number("JM2605A1B2C"));
        assert!(!is_valid_order_number("XX2605-A1B2C"));
        assert!(!is_valid_order_number("JM2605-a1b2c"));
        assert!(!is_valid_order_number("JM2605-A1B2"));
    }
}
