//! Capacity usage statistics for a single event.

use std::fmt;

use super::Capacity;

/// Registration totals for one event.
///
/// The used percentage is held as an integer number of hundredths of a
/// percent (`10_000` = 100.00 %), rounded half-up, so formatting never
/// depends on floating-point representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStats {
    /// Number of active registrations.
    pub registration_count: u32,
    /// Seats still available. Never negative.
    pub remaining_capacity: u32,
    /// Percentage of capacity in use, in hundredths of a percent.
    pub used_hundredths: u32,
}

impl EventStats {
    /// Computes stats from a registration count and the event capacity.
    #[must_use]
    pub fn compute(registration_count: u32, capacity: Capacity) -> Self {
        let cap = u64::from(capacity.get());
        let count = u64::from(registration_count);
        // round(count / cap * 10_000), half-up, in integer arithmetic
        let used = (count * 20_000 + cap) / (cap * 2);

        Self {
            registration_count,
            remaining_capacity: capacity.get().saturating_sub(registration_count),
            used_hundredths: u32::try_from(used).unwrap_or(u32::MAX),
        }
    }

    /// Returns `true` once every seat is taken.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.remaining_capacity == 0
    }

    /// Formats the used percentage as `"NN.NN%"`.
    #[must_use]
    pub fn used_percentage(&self) -> String {
        UsedPercentage(self.used_hundredths).to_string()
    }
}

struct UsedPercentage(u32);

impl fmt::Display for UsedPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn cap(n: u32) -> Capacity {
        let Some(c) = Capacity::new(n) else {
            panic!("valid capacity");
        };
        c
    }

    #[test]
    fn empty_event() {
        let stats = EventStats::compute(0, cap(50));
        assert_eq!(stats.remaining_capacity, 50);
        assert_eq!(stats.used_percentage(), "0.00%");
        assert!(!stats.is_full());
    }

    #[test]
    fn full_event_is_one_hundred_percent() {
        let stats = EventStats::compute(2, cap(2));
        assert_eq!(stats.remaining_capacity, 0);
        assert_eq!(stats.used_hundredths, 10_000);
        assert_eq!(stats.used_percentage(), "100.00%");
        assert!(stats.is_full());
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(EventStats::compute(1, cap(3)).used_percentage(), "33.33%");
        assert_eq!(EventStats::compute(2, cap(3)).used_percentage(), "66.67%");
        assert_eq!(EventStats::compute(1, cap(8)).used_percentage(), "12.50%");
        assert_eq!(EventStats::compute(1, cap(1000)).used_percentage(), "0.10%");
        assert_eq!(EventStats::compute(1, cap(7)).used_percentage(), "14.29%");
    }

    #[test]
    fn remaining_never_underflows() {
        let stats = EventStats::compute(5, cap(3));
        assert_eq!(stats.remaining_capacity, 0);
    }
}
