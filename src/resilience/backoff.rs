//! Capped exponential backoff with optional jitter.

use std::time::Duration;
use rand::Rng;

/// Calculate the delay to wait after the given failed attempt.
///
/// Attempt 1 waits `base_ms`, each further attempt doubles it, and the
/// result never exceeds `max_ms`. The schedule is monotonically non-decreasing.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);

    Duration::from_millis(delay_ms.min(max_ms))
}

/// Add 0 to 10% random jitter on top of a delay.
pub fn with_jitter(delay: Duration) -> Duration {
    let jitter_range = delay.as_millis() as u64 / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    delay + Duration::from_millis(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        assert_eq!(calculate_backoff(0, 100, 1000), Duration::ZERO);
        assert_eq!(calculate_backoff(1, 100, 1000), Duration::from_millis(100));
        assert_eq!(calculate_backoff(2, 100, 1000), Duration::from_millis(200));
        assert_eq!(calculate_backoff(3, 100, 1000), Duration::from_millis(400));
        assert_eq!(calculate_backoff(4, 100, 1000), Duration::from_millis(800));
        assert_eq!(calculate_backoff(5, 100, 1000), Duration::from_millis(1000));
        assert_eq!(calculate_backoff(64, 100, 1000), Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_is_monotonic() {
        let mut last = Duration::ZERO;
        for attempt in 1..40 {
            let delay = calculate_backoff(attempt, 37, 5_000);
            assert!(delay >= last);
            last = delay;
        }
    }

    #[test]
    fn test_jitter_bounds() {
        for _ in 0..100 {
            let d = with_jitter(Duration::from_millis(1000));
            assert!(d >= Duration::from_millis(1000));
            assert!(d < Duration::from_millis(1100));
        }
        assert_eq!(with_jitter(Duration::from_millis(5)), Duration::from_millis(5));
    }
}
