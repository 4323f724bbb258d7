use std::time::Duration;

/// Minimum spacing between weather alerts.
pub const WEATHER_ALERT_COOLDOWN: Duration = Duration::from_secs(6 * 60 * 60);

/// Last-fired rate limiter over Unix millisecond timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    min_interval: Duration,
}

impl Cooldown {
    pub const fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }

    /// True when strictly more than `min_interval` has passed since `last_fired`.
    pub fn ready(&self, last_fired: Option<i64>, now: i64) -> bool {
        let Some(last_fired) = last_fired else {
            return true;
        };
        let interval = i64::try_from(self.min_interval.as_millis()).unwrap_or(i64::MAX);
        now.saturating_sub(last_fired) > interval
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(WEATHER_ALERT_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 60 * 60 * 1000;

    #[test]
    fn never_fired_is_ready() {
        assert!(Cooldown::default().ready(None, 0));
    }

    #[test]
    fn boundary_is_exclusive() {
        let cooldown = Cooldown::default();
        let last = 1_700_000_000_000;
        assert!(!cooldown.ready(Some(last), last + HOUR_MS));
        assert!(!cooldown.ready(Some(last), last + 6 * HOUR_MS));
        assert!(cooldown.ready(Some(last), last + 6 * HOUR_MS + 1));
    }

    #[test]
    fn clock_going_backwards_is_not_ready() {
        let cooldown = Cooldown::new(Duration::from_secs(1));
        assert!(!cooldown.ready(Some(10_000), 5_000));
    }
}
