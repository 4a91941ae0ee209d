//! Lifetime discipline for stored records.

use std::time::Duration;

/// Longest lifetime a bulletin may buy: 180 days.
pub const MAX_TTL: Duration = Duration::from_secs(180 * 24 * 60 * 60);

/// Floor applied when the requested expiry is already in the past: 1 hour.
pub const MIN_TTL: Duration = Duration::from_secs(60 * 60);

/// Clamp an absolute expiry second into a bounded relative lifetime.
///
/// Pure in `now` so the three records written for one creation derive the
/// exact same lifetime from one clock reading.
pub fn to_valid_ttl(expire_sec: i64, now_sec: i64) -> Duration {
    if expire_sec > now_sec {
        MAX_TTL.min(Duration::from_secs((expire_sec - now_sec) as u64))
    } else {
        MIN_TTL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_future_expiry_within_cap() {
        assert_eq!(
            to_valid_ttl(NOW + 3_600, NOW),
            Duration::from_secs(3_600)
        );
    }

    #[test]
    fn test_expiry_clamped_to_max() {
        let one_year = NOW + 365 * 24 * 3_600;
        assert_eq!(to_valid_ttl(one_year, NOW), MAX_TTL);
    }

    #[test]
    fn test_past_expiry_gets_floor() {
        assert_eq!(to_valid_ttl(NOW - 1, NOW), MIN_TTL);
        assert_eq!(to_valid_ttl(NOW, NOW), MIN_TTL);
        assert_eq!(to_valid_ttl(0, NOW), MIN_TTL);
    }

    #[test]
    fn test_one_second_ahead() {
        assert_eq!(to_valid_ttl(NOW + 1, NOW), Duration::from_secs(1));
    }
}
