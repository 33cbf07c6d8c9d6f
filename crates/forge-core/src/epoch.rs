//! Fixed system epoch and interoperability constants.
//!
//! The epoch is the (start, end) instant pair defining the whole system's
//! lifetime. It is baked into both the client and the server and never
//! mutates after deployment; historical records depend on these exact
//! values, so changing any constant here breaks score reproducibility.

use chrono::{DateTime, TimeZone, Utc};

/// Total execution days between epoch start and end.
pub const TOTAL_DAYS: u32 = 365;

/// A score at or below this percentage mandates a punishment.
pub const PUNISHMENT_THRESHOLD: u32 = 85;

/// The minimum percentage eligible for reward. Kept as an independent
/// constant: 85 is consciously excluded from reward, 86 is the first
/// rewardable score.
pub const REWARD_THRESHOLD: u32 = 86;

/// Total point budget distributed across a day's floor actions.
pub const FLOOR_POINT_BUDGET: u32 = 20;

/// Epoch start: `2026-02-01T00:00:00Z`.
pub fn system_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()
}

/// Epoch end: `2027-02-01T00:00:00Z`.
pub fn system_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2027, 2, 1, 0, 0, 0).unwrap()
}

/// Total epoch duration in milliseconds, derived once from the pair.
pub fn total_duration_ms() -> i64 {
    (system_end() - system_start()).num_milliseconds()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_is_after_start() {
        assert!(system_end() > system_start());
    }

    #[test]
    fn duration_covers_total_days() {
        // 2026-02-01 .. 2027-02-01 is exactly 365 days.
        let days = (system_end() - system_start()).num_days();
        assert_eq!(days, TOTAL_DAYS as i64);
    }

    #[test]
    fn thresholds_are_adjacent_but_independent() {
        assert_eq!(PUNISHMENT_THRESHOLD, 85);
        assert_eq!(REWARD_THRESHOLD, 86);
    }
}
